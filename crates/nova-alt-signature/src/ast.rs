use std::ops::Range;

use nova_types::Variance;

/// A parsed alternative signature: `fun <T : Bound> name(params): Return where T : Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub name_span: Range<usize>,
    /// Present for `fun Receiver.name(...)`; such signatures are parsed but not supported by the
    /// reconciliation engine.
    pub receiver: Option<TypeNode>,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ParamDecl>,
    /// `None` when no return type is written (a `Unit` function or a constructor).
    pub return_type: Option<TypeNode>,
    pub where_clauses: Vec<WhereClause>,
}

impl FunctionDecl {
    /// Bounds declared for `param`, inline bound first, then `where` constraints in order.
    pub fn bounds_of<'a>(&'a self, param: &'a TypeParamDecl) -> Vec<&'a TypeNode> {
        param
            .bound
            .iter()
            .chain(
                self.where_clauses
                    .iter()
                    .filter(|clause| clause.param == param.name)
                    .map(|clause| &clause.bound),
            )
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: String,
    pub bound: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub param: String,
    pub bound: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub is_vararg: bool,
    /// The declared type; for `vararg` parameters this is the element type.
    pub ty: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Reference(TypeReference),
    Nullable(Box<TypeNode>),
    Function(FunctionTypeNode),
    /// `This`, the self type.
    SelfType { span: Range<usize> },
}

impl TypeNode {
    /// Source-like rendering used in diagnostics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            TypeNode::Reference(reference) => {
                out.push_str(&reference.qualified_name());
                if !reference.args.is_empty() {
                    out.push('<');
                    for (idx, arg) in reference.args.iter().enumerate() {
                        if idx > 0 {
                            out.push_str(", ");
                        }
                        arg.render_into(out);
                    }
                    out.push('>');
                }
            }
            TypeNode::Nullable(inner) => {
                let wrap = matches!(inner.as_ref(), TypeNode::Function(_));
                if wrap {
                    out.push('(');
                }
                inner.render_into(out);
                if wrap {
                    out.push(')');
                }
                out.push('?');
            }
            TypeNode::Function(function) => {
                if let Some(receiver) = &function.receiver {
                    receiver.render_into(out);
                    out.push('.');
                }
                out.push('(');
                for (idx, param) in function.params.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    param.render_into(out);
                }
                out.push_str(") -> ");
                function.return_type.render_into(out);
            }
            TypeNode::SelfType { .. } => out.push_str("This"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Name segments as written, e.g. `["java", "util", "Map", "Entry"]`.
    pub segments: Vec<String>,
    pub args: Vec<TypeArgNode>,
    pub span: Range<usize>,
}

impl TypeReference {
    pub fn qualified_name(&self) -> String {
        self.segments.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgNode {
    Star,
    Projected { variance: Variance, ty: TypeNode },
}

impl TypeArgNode {
    fn render_into(&self, out: &mut String) {
        match self {
            TypeArgNode::Star => out.push('*'),
            TypeArgNode::Projected { variance, ty } => {
                let keyword = variance.keyword();
                if !keyword.is_empty() {
                    out.push_str(keyword);
                    out.push(' ');
                }
                ty.render_into(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTypeNode {
    pub receiver: Option<Box<TypeNode>>,
    pub params: Vec<TypeNode>,
    pub return_type: Box<TypeNode>,
}

impl FunctionTypeNode {
    /// Name of the builtin interface this function type denotes, e.g. `kotlin.Function2` or
    /// `kotlin.ExtensionFunction1`.
    pub fn interface_name(&self) -> String {
        match self.receiver {
            Some(_) => format!("kotlin.ExtensionFunction{}", self.params.len()),
            None => format!("kotlin.Function{}", self.params.len()),
        }
    }

    /// Type arguments of the function interface: receiver, parameters, then the return type.
    pub fn interface_args(&self) -> Vec<TypeArgNode> {
        self.receiver
            .iter()
            .map(|receiver| receiver.as_ref())
            .chain(self.params.iter())
            .chain(std::iter::once(self.return_type.as_ref()))
            .map(|ty| TypeArgNode::Projected {
                variance: Variance::Invariant,
                ty: ty.clone(),
            })
            .collect()
    }
}
