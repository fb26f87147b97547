use std::fmt::Write;

use crate::{Nullability, Type, TypeArg, TypeEnv};

/// Render `ty` the way diagnostics print it: fully qualified class names, `?` for nullable and
/// `!` for platform types, e.g. `kotlin.collections.List<out T>?`.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, out: &mut String) {
    match ty {
        Type::Error => out.push_str("<error>"),
        Type::TypeVar(var) => {
            match env.type_param(var.id) {
                Some(def) => out.push_str(&def.name),
                None => {
                    let _ = write!(out, "T#{}", var.id.to_raw());
                }
            }
            write_nullability(var.nullability, out);
        }
        Type::Class(class) => {
            match env.class(class.def) {
                Some(def) => out.push_str(&def.name),
                None => {
                    let _ = write!(out, "<class#{}>", class.def.to_raw());
                }
            }
            if !class.args.is_empty() {
                out.push('<');
                for (idx, arg) in class.args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    match arg {
                        TypeArg::Star => out.push('*'),
                        TypeArg::Projected { variance, ty } => {
                            let keyword = variance.keyword();
                            if !keyword.is_empty() {
                                out.push_str(keyword);
                                out.push(' ');
                            }
                            write_type(env, ty, out);
                        }
                    }
                }
                out.push('>');
            }
            write_nullability(class.nullability, out);
        }
    }
}

fn write_nullability(nullability: Nullability, out: &mut String) {
    match nullability {
        Nullability::NotNull => {}
        Nullability::Nullable => out.push('?'),
        Nullability::Flexible => out.push('!'),
    }
}
