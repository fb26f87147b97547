use nova_types::{Substitution, Type, TypeEnv, TypeParamId, Variance};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameter {
    /// Position in the member's value parameter list.
    pub index: usize,
    pub name: String,
    /// Declared type. For a vararg parameter this is the array type.
    pub ty: Type,
    /// Element type of a vararg parameter; `None` for ordinary parameters.
    pub vararg_element: Option<Type>,
    pub declares_default_value: bool,
    pub is_crossinline: bool,
    pub is_noinline: bool,
}

impl ValueParameter {
    pub fn new(index: usize, name: impl Into<String>, ty: Type) -> Self {
        Self {
            index,
            name: name.into(),
            ty,
            vararg_element: None,
            declares_default_value: false,
            is_crossinline: false,
            is_noinline: false,
        }
    }

    pub fn vararg(index: usize, name: impl Into<String>, array: Type, element: Type) -> Self {
        Self {
            vararg_element: Some(element),
            ..Self::new(index, name, array)
        }
    }

    pub fn is_vararg(&self) -> bool {
        self.vararg_element.is_some()
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    fn substitute(&self, subst: &Substitution) -> Self {
        Self {
            ty: self.ty.substitute(subst),
            vararg_element: self.vararg_element.as_ref().map(|ty| ty.substitute(subst)),
            ..self.clone()
        }
    }
}

/// A function or constructor type parameter.
///
/// `id` is the identity types inside the signature refer to; renaming a parameter changes
/// `name` only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub id: TypeParamId,
    pub index: usize,
    pub name: String,
    pub variance: Variance,
    /// Never empty; a parameter without declared bounds has the implicit `Any?`.
    pub upper_bounds: Vec<Type>,
}

impl TypeParameter {
    fn substitute(&self, subst: &Substitution) -> Self {
        Self {
            upper_bounds: self
                .upper_bounds
                .iter()
                .map(|bound| bound.substitute(subst))
                .collect(),
            ..self.clone()
        }
    }
}

/// Accumulates bounds for one type parameter, then freezes into a [`TypeParameter`].
#[derive(Debug)]
pub struct TypeParameterBuilder {
    id: TypeParamId,
    index: usize,
    name: String,
    variance: Variance,
    upper_bounds: Vec<Type>,
}

impl TypeParameterBuilder {
    pub fn new(id: TypeParamId, index: usize, name: impl Into<String>, variance: Variance) -> Self {
        Self {
            id,
            index,
            name: name.into(),
            variance,
            upper_bounds: Vec::new(),
        }
    }

    pub fn add_upper_bound(&mut self, bound: Type) {
        self.upper_bounds.push(bound);
    }

    pub fn build(self, env: &dyn TypeEnv) -> TypeParameter {
        let upper_bounds = if self.upper_bounds.is_empty() {
            vec![env.default_upper_bound()]
        } else {
            self.upper_bounds
        };
        TypeParameter {
            id: self.id,
            index: self.index,
            name: self.name,
            variance: self.variance,
            upper_bounds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Constructor,
}

/// Everything known about one member's declaration: what the binary reader inferred, or the
/// result of refining it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSignature {
    pub kind: MemberKind,
    pub name: String,
    /// Extension receiver. Only present on signatures promoted from extension super methods.
    pub receiver: Option<Type>,
    pub value_params: Vec<ValueParameter>,
    pub type_params: Vec<TypeParameter>,
    /// `None` for constructors.
    pub return_type: Option<Type>,
    /// Whether parameter names are meaningful to callers (named arguments). Names read from
    /// class files without debug info are not.
    pub has_stable_parameter_names: bool,
}

impl MemberSignature {
    pub fn method(name: impl Into<String>, value_params: Vec<ValueParameter>, return_type: Type) -> Self {
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            receiver: None,
            value_params,
            type_params: Vec::new(),
            return_type: Some(return_type),
            has_stable_parameter_names: false,
        }
    }

    pub fn constructor(class_simple_name: impl Into<String>, value_params: Vec<ValueParameter>) -> Self {
        Self {
            kind: MemberKind::Constructor,
            name: class_simple_name.into(),
            receiver: None,
            value_params,
            type_params: Vec::new(),
            return_type: None,
            has_stable_parameter_names: false,
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParameter>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_stable_parameter_names(mut self, stable: bool) -> Self {
        self.has_stable_parameter_names = stable;
        self
    }

    /// Apply `subst` to every type in the signature.
    pub fn substitute(&self, subst: &Substitution) -> Self {
        if subst.is_empty() {
            return self.clone();
        }
        Self {
            kind: self.kind,
            name: self.name.clone(),
            receiver: self.receiver.as_ref().map(|ty| ty.substitute(subst)),
            value_params: self
                .value_params
                .iter()
                .map(|param| param.substitute(subst))
                .collect(),
            type_params: self
                .type_params
                .iter()
                .map(|param| param.substitute(subst))
                .collect(),
            return_type: self.return_type.as_ref().map(|ty| ty.substitute(subst)),
            has_stable_parameter_names: self.has_stable_parameter_names,
        }
    }

    /// Substitution mapping this signature's type parameters, by position, onto `other`'s.
    ///
    /// `None` when the counts differ.
    pub fn type_param_substitution(&self, other: &MemberSignature) -> Option<Substitution> {
        if self.type_params.len() != other.type_params.len() {
            return None;
        }
        Some(
            self.type_params
                .iter()
                .zip(&other.type_params)
                .map(|(ours, theirs)| {
                    let target = Type::type_var(theirs.id);
                    (ours.id, target)
                })
                .collect(),
        )
    }
}
