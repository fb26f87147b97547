use std::collections::HashMap;

use crate::{ClassId, Type, TypeArg, TypeParamId, Variance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Fully qualified Kotlin name, e.g. `kotlin.collections.List`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamId>,
    /// Immediate supertypes, expressed in terms of this class's own type parameters.
    pub supertypes: Vec<Type>,
}

impl ClassDef {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeParamOwner {
    Class(ClassId),
    /// Declared by a function or constructor.
    Callable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub variance: Variance,
    pub upper_bounds: Vec<Type>,
    pub owner: TypeParamOwner,
}

/// Ids of the builtin classes the signature machinery refers to directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnown {
    pub any: ClassId,
    pub nothing: ClassId,
    pub unit: ClassId,
    pub number: ClassId,
    pub comparable: ClassId,
    pub char_sequence: ClassId,
    pub string: ClassId,
    pub boolean: ClassId,
    pub char: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub int: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub array: ClassId,
}

/// Read access to class and type parameter declarations.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeParamId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnown;

    /// Kotlin's implicit upper bound, `kotlin.Any?`.
    fn default_upper_bound(&self) -> Type {
        Type::class(self.well_known().any, vec![]).nullable()
    }

    /// The element class of a primitive array class (`kotlin.IntArray` -> `kotlin.Int`).
    fn primitive_array_element(&self, id: ClassId) -> Option<ClassId> {
        let name = self.class(id)?.name.as_str();
        let element = PRIMITIVE_ARRAYS
            .iter()
            .find_map(|(array, element)| (*array == name).then_some(*element))?;
        self.lookup_class(element)
    }
}

pub(crate) const PRIMITIVE_ARRAYS: &[(&str, &str)] = &[
    ("kotlin.BooleanArray", "kotlin.Boolean"),
    ("kotlin.CharArray", "kotlin.Char"),
    ("kotlin.ByteArray", "kotlin.Byte"),
    ("kotlin.ShortArray", "kotlin.Short"),
    ("kotlin.IntArray", "kotlin.Int"),
    ("kotlin.LongArray", "kotlin.Long"),
    ("kotlin.FloatArray", "kotlin.Float"),
    ("kotlin.DoubleArray", "kotlin.Double"),
];

/// Highest arity of the builtin `kotlin.FunctionN` / `kotlin.ExtensionFunctionN` interfaces.
pub const MAX_FUNCTION_ARITY: usize = 8;

/// Owned table of classes and type parameters.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    class_by_name: HashMap<String, ClassId>,
    well_known: WellKnown,
}

impl TypeStore {
    /// A store populated with the Kotlin builtins (`kotlin.Any`, primitives, arrays, the
    /// read-only and mutable collection interfaces, and the function interfaces).
    pub fn with_builtins() -> Self {
        let placeholder = ClassId::from_raw(0);
        let mut store = TypeStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            class_by_name: HashMap::new(),
            well_known: WellKnown {
                any: placeholder,
                nothing: placeholder,
                unit: placeholder,
                number: placeholder,
                comparable: placeholder,
                char_sequence: placeholder,
                string: placeholder,
                boolean: placeholder,
                char: placeholder,
                byte: placeholder,
                short: placeholder,
                int: placeholder,
                long: placeholder,
                float: placeholder,
                double: placeholder,
                array: placeholder,
            },
        };
        store.install_builtins();
        store
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    /// Reserve an id for `name` so type parameters can refer to their owner before the class is
    /// defined. Returns the existing id when the name is already known.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Class,
            type_params: Vec::new(),
            supertypes: Vec::new(),
        });
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.to_raw() as usize;
        if idx >= self.classes.len() {
            return;
        }
        self.class_by_name.insert(def.name.clone(), id);
        self.classes[idx] = def;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(
        &mut self,
        name: impl Into<String>,
        variance: Variance,
        owner: TypeParamOwner,
        upper_bounds: Vec<Type>,
    ) -> TypeParamId {
        let id = TypeParamId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            variance,
            upper_bounds,
            owner,
        });
        id
    }

    /// Replace the bounds of an already allocated type parameter. Used for self-referential
    /// bounds (`T : Comparable<T>`), which need the parameter's id first.
    pub fn set_upper_bounds(&mut self, id: TypeParamId, upper_bounds: Vec<Type>) {
        if let Some(def) = self.type_params.get_mut(id.to_raw() as usize) {
            def.upper_bounds = upper_bounds;
        }
    }

    /// Define a generic class in one go: allocates its type parameters (bounded by `Any?`) and
    /// lets `supertypes` refer to them.
    pub fn add_generic_class(
        &mut self,
        name: &str,
        kind: ClassKind,
        params: &[(&str, Variance)],
        supertypes: impl FnOnce(&[TypeParamId]) -> Vec<Type>,
    ) -> ClassId {
        let id = self.intern_class_id(name);
        let bound = self.default_upper_bound();
        let type_params: Vec<TypeParamId> = params
            .iter()
            .map(|(param, variance)| {
                self.add_type_param(*param, *variance, TypeParamOwner::Class(id), vec![bound.clone()])
            })
            .collect();
        let supertypes = supertypes(&type_params);
        self.define_class(
            id,
            ClassDef {
                name: name.to_string(),
                kind,
                type_params,
                supertypes,
            },
        );
        id
    }

    fn install_builtins(&mut self) {
        let any = self.add_class(ClassDef {
            name: "kotlin.Any".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            supertypes: vec![],
        });
        self.well_known.any = any;
        let any_ty = Type::class(any, vec![]);

        let simple = |store: &mut TypeStore, name: &str, supertypes: Vec<Type>| {
            store.add_class(ClassDef {
                name: name.to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                supertypes,
            })
        };

        self.well_known.nothing = simple(self, "kotlin.Nothing", vec![]);
        self.well_known.unit = simple(self, "kotlin.Unit", vec![any_ty.clone()]);

        let comparable = self.add_generic_class(
            "kotlin.Comparable",
            ClassKind::Interface,
            &[("T", Variance::In)],
            |_| vec![],
        );
        self.well_known.comparable = comparable;
        let comparable_of =
            |id: ClassId| Type::class(comparable, vec![TypeArg::invariant(Type::class(id, vec![]))]);

        self.well_known.number = simple(self, "kotlin.Number", vec![any_ty.clone()]);
        let number_ty = Type::class(self.well_known.number, vec![]);
        self.well_known.char_sequence = self.add_class(ClassDef {
            name: "kotlin.CharSequence".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![],
            supertypes: vec![],
        });

        let string = self.intern_class_id("kotlin.String");
        self.define_class(
            string,
            ClassDef {
                name: "kotlin.String".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                supertypes: vec![
                    Type::class(self.well_known.char_sequence, vec![]),
                    comparable_of(string),
                ],
            },
        );
        self.well_known.string = string;

        for name in [
            "kotlin.Boolean",
            "kotlin.Char",
            "kotlin.Byte",
            "kotlin.Short",
            "kotlin.Int",
            "kotlin.Long",
            "kotlin.Float",
            "kotlin.Double",
        ] {
            let id = self.intern_class_id(name);
            let mut supertypes = vec![comparable_of(id)];
            if !matches!(name, "kotlin.Boolean" | "kotlin.Char") {
                supertypes.insert(0, number_ty.clone());
            }
            self.define_class(
                id,
                ClassDef {
                    name: name.to_string(),
                    kind: ClassKind::Class,
                    type_params: vec![],
                    supertypes,
                },
            );
        }
        self.well_known.boolean = self.class_id_or_any("kotlin.Boolean");
        self.well_known.char = self.class_id_or_any("kotlin.Char");
        self.well_known.byte = self.class_id_or_any("kotlin.Byte");
        self.well_known.short = self.class_id_or_any("kotlin.Short");
        self.well_known.int = self.class_id_or_any("kotlin.Int");
        self.well_known.long = self.class_id_or_any("kotlin.Long");
        self.well_known.float = self.class_id_or_any("kotlin.Float");
        self.well_known.double = self.class_id_or_any("kotlin.Double");

        self.well_known.array = self.add_generic_class(
            "kotlin.Array",
            ClassKind::Class,
            &[("T", Variance::Invariant)],
            |_| vec![any_ty.clone()],
        );
        for (array, _) in PRIMITIVE_ARRAYS {
            simple(self, array, vec![any_ty.clone()]);
        }

        self.install_collections();
        self.install_function_interfaces();
    }

    fn install_collections(&mut self) {
        use ClassKind::Interface;
        use Variance::{Invariant, Out};

        let arg = |id: TypeParamId| TypeArg::invariant(Type::type_var(id));

        let iterator =
            self.add_generic_class("kotlin.collections.Iterator", Interface, &[("T", Out)], |_| {
                vec![]
            });
        self.add_generic_class(
            "kotlin.collections.MutableIterator",
            Interface,
            &[("T", Out)],
            |p| vec![Type::class(iterator, vec![arg(p[0])])],
        );
        let iterable =
            self.add_generic_class("kotlin.collections.Iterable", Interface, &[("T", Out)], |_| {
                vec![]
            });
        let mutable_iterable = self.add_generic_class(
            "kotlin.collections.MutableIterable",
            Interface,
            &[("T", Out)],
            |p| vec![Type::class(iterable, vec![arg(p[0])])],
        );
        let collection = self.add_generic_class(
            "kotlin.collections.Collection",
            Interface,
            &[("E", Out)],
            |p| vec![Type::class(iterable, vec![arg(p[0])])],
        );
        let mutable_collection = self.add_generic_class(
            "kotlin.collections.MutableCollection",
            Interface,
            &[("E", Invariant)],
            |p| {
                vec![
                    Type::class(collection, vec![arg(p[0])]),
                    Type::class(mutable_iterable, vec![arg(p[0])]),
                ]
            },
        );
        for (read_only, mutable) in [
            ("kotlin.collections.List", "kotlin.collections.MutableList"),
            ("kotlin.collections.Set", "kotlin.collections.MutableSet"),
        ] {
            let read_only_id = self.add_generic_class(read_only, Interface, &[("E", Out)], |p| {
                vec![Type::class(collection, vec![arg(p[0])])]
            });
            self.add_generic_class(mutable, Interface, &[("E", Invariant)], |p| {
                vec![
                    Type::class(read_only_id, vec![arg(p[0])]),
                    Type::class(mutable_collection, vec![arg(p[0])]),
                ]
            });
        }
        let map = self.add_generic_class(
            "kotlin.collections.Map",
            Interface,
            &[("K", Invariant), ("V", Out)],
            |_| vec![],
        );
        self.add_generic_class(
            "kotlin.collections.MutableMap",
            Interface,
            &[("K", Invariant), ("V", Invariant)],
            |p| vec![Type::class(map, vec![arg(p[0]), arg(p[1])])],
        );
    }

    fn install_function_interfaces(&mut self) {
        let any = Type::class(self.well_known.any, vec![]);
        for arity in 0..=MAX_FUNCTION_ARITY {
            let names: Vec<String> = (1..=arity).map(|i| format!("P{i}")).collect();

            let mut params: Vec<(&str, Variance)> =
                names.iter().map(|name| (name.as_str(), Variance::In)).collect();
            params.push(("R", Variance::Out));
            self.add_generic_class(
                &format!("kotlin.Function{arity}"),
                ClassKind::Interface,
                &params,
                |_| vec![any.clone()],
            );

            params.insert(0, ("T", Variance::In));
            self.add_generic_class(
                &format!("kotlin.ExtensionFunction{arity}"),
                ClassKind::Interface,
                &params,
                |_| vec![any.clone()],
            );
        }
    }

    fn class_id_or_any(&self, name: &str) -> ClassId {
        self.class_id(name).unwrap_or(self.well_known.any)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.to_raw() as usize)
    }

    fn type_param(&self, id: TypeParamId) -> Option<&TypeParamDef> {
        self.type_params.get(id.to_raw() as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnown {
        &self.well_known
    }
}
