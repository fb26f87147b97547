use std::collections::HashMap;

use nova_types::{supertype_substitution, ClassId, Type, TypeEnv};

use crate::reconciler::SupertypeCandidate;
use crate::signature::MemberSignature;

/// A member as declared in its own class, in terms of that class's type parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredMember {
    pub signature: MemberSignature,
    pub is_suspend: bool,
}

impl DeclaredMember {
    pub fn new(signature: MemberSignature) -> Self {
        Self {
            signature,
            is_suspend: false,
        }
    }
}

/// The hierarchy information reconciliation needs: immediate supertypes and member lookup by
/// simple name.
pub trait SupertypeHierarchy {
    fn immediate_supertypes(&self, class: ClassId) -> Vec<Type>;
    fn members_named(&self, class: ClassId, name: &str) -> Vec<DeclaredMember>;
}

/// In-memory hierarchy: supertypes come from the type environment, members are registered
/// explicitly.
pub struct MemberTable<'a> {
    env: &'a dyn TypeEnv,
    members: HashMap<(ClassId, String), Vec<DeclaredMember>>,
}

impl<'a> MemberTable<'a> {
    pub fn new(env: &'a dyn TypeEnv) -> Self {
        Self {
            env,
            members: HashMap::new(),
        }
    }

    pub fn add(&mut self, class: ClassId, member: DeclaredMember) {
        self.members
            .entry((class, member.signature.name.clone()))
            .or_default()
            .push(member);
    }
}

impl SupertypeHierarchy for MemberTable<'_> {
    fn immediate_supertypes(&self, class: ClassId) -> Vec<Type> {
        self.env
            .class(class)
            .map(|def| def.supertypes.clone())
            .unwrap_or_default()
    }

    fn members_named(&self, class: ClassId, name: &str) -> Vec<DeclaredMember> {
        self.members
            .get(&(class, name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Members named `name` in the immediate supertypes of `class`, with each supertype's type
/// parameters replaced by the arguments on the inheritance edge. A raw edge leaves them as they
/// are.
pub fn collect_super_candidates(
    env: &dyn TypeEnv,
    hierarchy: &dyn SupertypeHierarchy,
    class: ClassId,
    name: &str,
) -> Vec<SupertypeCandidate> {
    let mut out = Vec::new();
    for supertype in hierarchy.immediate_supertypes(class) {
        let Type::Class(supertype) = supertype else {
            continue;
        };
        let subst = supertype_substitution(env, &supertype);
        let owner_name = env
            .class(supertype.def)
            .map(|def| def.name.clone())
            .unwrap_or_default();
        for member in hierarchy.members_named(supertype.def, name) {
            out.push(SupertypeCandidate {
                owner: supertype.def,
                owner_name: owner_name.clone(),
                signature: member.signature.substitute(&subst),
                is_suspend: member.is_suspend,
            });
        }
    }
    out
}
