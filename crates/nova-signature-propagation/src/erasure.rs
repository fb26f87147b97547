//! Erased JVM signatures, used to decide whether a super method is "the same" member.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use nova_types::{Nullability, Type, TypeArg, TypeEnv, TypeParamId};

use crate::signature::MemberSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn descriptor(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/util/List`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    fn write_descriptor(&self, out: &mut String) {
        match self {
            FieldType::Base(base) => out.push(base.descriptor()),
            FieldType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            FieldType::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }
}

/// Member name plus erased parameter types. The extension receiver, if any, is the first
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErasedSignature {
    pub name: String,
    pub params: Vec<FieldType>,
}

impl ErasedSignature {
    /// Parameter part of the JVM method descriptor, e.g. `(Ljava/util/List;I)`.
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        out
    }
}

impl fmt::Display for ErasedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor())
    }
}

const OBJECT: &str = "java/lang/Object";

const PRIMITIVES: &[(&str, BaseType, &str)] = &[
    ("kotlin.Boolean", BaseType::Boolean, "java/lang/Boolean"),
    ("kotlin.Char", BaseType::Char, "java/lang/Character"),
    ("kotlin.Byte", BaseType::Byte, "java/lang/Byte"),
    ("kotlin.Short", BaseType::Short, "java/lang/Short"),
    ("kotlin.Int", BaseType::Int, "java/lang/Integer"),
    ("kotlin.Long", BaseType::Long, "java/lang/Long"),
    ("kotlin.Float", BaseType::Float, "java/lang/Float"),
    ("kotlin.Double", BaseType::Double, "java/lang/Double"),
];

const PRIMITIVE_ARRAYS: &[(&str, BaseType)] = &[
    ("kotlin.BooleanArray", BaseType::Boolean),
    ("kotlin.CharArray", BaseType::Char),
    ("kotlin.ByteArray", BaseType::Byte),
    ("kotlin.ShortArray", BaseType::Short),
    ("kotlin.IntArray", BaseType::Int),
    ("kotlin.LongArray", BaseType::Long),
    ("kotlin.FloatArray", BaseType::Float),
    ("kotlin.DoubleArray", BaseType::Double),
];

const MAPPED_CLASSES: &[(&str, &str)] = &[
    ("kotlin.Any", OBJECT),
    ("kotlin.Nothing", "java/lang/Void"),
    ("kotlin.String", "java/lang/String"),
    ("kotlin.CharSequence", "java/lang/CharSequence"),
    ("kotlin.Number", "java/lang/Number"),
    ("kotlin.Comparable", "java/lang/Comparable"),
    ("kotlin.Throwable", "java/lang/Throwable"),
    ("kotlin.Enum", "java/lang/Enum"),
    ("kotlin.Annotation", "java/lang/annotation/Annotation"),
    ("kotlin.collections.Iterator", "java/util/Iterator"),
    ("kotlin.collections.MutableIterator", "java/util/Iterator"),
    ("kotlin.collections.Iterable", "java/lang/Iterable"),
    ("kotlin.collections.MutableIterable", "java/lang/Iterable"),
    ("kotlin.collections.Collection", "java/util/Collection"),
    ("kotlin.collections.MutableCollection", "java/util/Collection"),
    ("kotlin.collections.List", "java/util/List"),
    ("kotlin.collections.MutableList", "java/util/List"),
    ("kotlin.collections.Set", "java/util/Set"),
    ("kotlin.collections.MutableSet", "java/util/Set"),
    ("kotlin.collections.Map", "java/util/Map"),
    ("kotlin.collections.MutableMap", "java/util/Map"),
];

/// Maps Kotlin types to the JVM types they compile to.
///
/// Immutable once built. [`SignatureMapper::shared`] is the process-wide instance; callers that
/// want their own (tests, embedders) construct one and pass it in.
#[derive(Debug)]
pub struct SignatureMapper {
    primitives: HashMap<&'static str, (BaseType, &'static str)>,
    primitive_arrays: HashMap<&'static str, BaseType>,
    classes: HashMap<&'static str, &'static str>,
}

impl Default for SignatureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureMapper {
    pub fn new() -> Self {
        Self {
            primitives: PRIMITIVES
                .iter()
                .map(|(name, base, boxed)| (*name, (*base, *boxed)))
                .collect(),
            primitive_arrays: PRIMITIVE_ARRAYS.iter().copied().collect(),
            classes: MAPPED_CLASSES.iter().copied().collect(),
        }
    }

    pub fn shared() -> &'static SignatureMapper {
        static SHARED: OnceLock<SignatureMapper> = OnceLock::new();
        SHARED.get_or_init(SignatureMapper::new)
    }

    pub fn erase_signature(&self, env: &dyn TypeEnv, signature: &MemberSignature) -> ErasedSignature {
        let params = signature
            .receiver
            .iter()
            .chain(signature.value_params.iter().map(|param| &param.ty))
            .map(|ty| self.map_type(env, ty))
            .collect();
        ErasedSignature {
            name: signature.name.clone(),
            params,
        }
    }

    pub fn map_type(&self, env: &dyn TypeEnv, ty: &Type) -> FieldType {
        self.map_type_inner(env, ty, false, &mut HashSet::new())
    }

    fn map_type_inner(
        &self,
        env: &dyn TypeEnv,
        ty: &Type,
        boxed: bool,
        visiting: &mut HashSet<TypeParamId>,
    ) -> FieldType {
        match ty {
            Type::Error => FieldType::Object(OBJECT.to_string()),
            Type::TypeVar(var) => {
                if !visiting.insert(var.id) {
                    return FieldType::Object(OBJECT.to_string());
                }
                let bound = env
                    .type_param(var.id)
                    .and_then(|def| def.upper_bounds.first().cloned());
                let mapped = match bound {
                    Some(bound) => self.map_type_inner(env, &bound, true, visiting),
                    None => FieldType::Object(OBJECT.to_string()),
                };
                visiting.remove(&var.id);
                mapped
            }
            Type::Class(class) => {
                let Some(def) = env.class(class.def) else {
                    return FieldType::Object(OBJECT.to_string());
                };
                let name = def.name.as_str();

                if let Some((base, boxed_name)) = self.primitives.get(name) {
                    return if boxed || class.nullability != Nullability::NotNull {
                        FieldType::Object((*boxed_name).to_string())
                    } else {
                        FieldType::Base(*base)
                    };
                }
                if let Some(base) = self.primitive_arrays.get(name) {
                    return FieldType::Array(Box::new(FieldType::Base(*base)));
                }
                if class.def == env.well_known().array {
                    let element = match class.args.first() {
                        Some(TypeArg::Projected { ty, .. }) => {
                            self.map_type_inner(env, ty, true, visiting)
                        }
                        _ => FieldType::Object(OBJECT.to_string()),
                    };
                    return FieldType::Array(Box::new(element));
                }
                if let Some(mapped) = self.classes.get(name) {
                    return FieldType::Object((*mapped).to_string());
                }
                FieldType::Object(name.replace('.', "/"))
            }
        }
    }
}
