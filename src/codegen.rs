//! Emission of C code from symbolic assignments.

use crate::grid::{Grid, GridError};
use crate::params::{ParamRegistry, ParamType};
use crate::symbolic::{ccode, Expr};
use std::fmt::Write as _;

/// A single assignment `lhs = rhs`, where the left hand side is a C lvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct Lhrh {
    pub lhs: String,
    pub rhs: Expr,
}

impl Lhrh {
    pub fn new(lhs: impl Into<String>, rhs: Expr) -> Self {
        Self {
            lhs: lhs.into(),
            rhs,
        }
    }
}

/// Options controlling the layout of emitted code.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Wrap the assignments in a `{ ... }` scope.
    pub braces: bool,
    /// Declare each left hand side with the given type, e.g. `const REAL`.
    pub declare: Option<String>,
    /// Precede the code with a comment listing the original expressions.
    pub comment: bool,
    /// Indentation of the block, in spaces.
    pub indent: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            braces: true,
            declare: None,
            comment: true,
            indent: 0,
        }
    }
}

/// Number of spaces each nested scope is indented by.
const STEP: usize = 3;

fn comment_lines(out: &mut String, pad: &str, assignments: &[Lhrh]) {
    writeln!(out, "{pad}/*").unwrap();
    writeln!(out, "{pad} *  Original symbolic expressions:").unwrap();

    let last = assignments.len().saturating_sub(1);
    for (i, assignment) in assignments.iter().enumerate() {
        let open = if i == 0 { "\"[" } else { "  " };
        let close = if i == last { "]\"" } else { "," };
        writeln!(
            out,
            "{pad} *  {open}{} = {}{close}",
            assignment.lhs, assignment.rhs
        )
        .unwrap();
    }

    writeln!(out, "{pad} */").unwrap();
}

/// Emits a block of C assignments, one per `Lhrh`.
pub fn output_c(assignments: &[Lhrh], options: &CodegenOptions) -> String {
    let mut out = String::new();
    let pad = " ".repeat(options.indent);

    if options.comment && !assignments.is_empty() {
        comment_lines(&mut out, &pad, assignments);
    }

    let inner = if options.braces {
        writeln!(out, "{pad}{{").unwrap();
        " ".repeat(options.indent + STEP)
    } else {
        pad.clone()
    };

    for assignment in assignments {
        let declare = options
            .declare
            .as_ref()
            .map(|ty| format!("{ty} "))
            .unwrap_or_default();
        writeln!(
            out,
            "{inner}{declare}{} = {};",
            assignment.lhs,
            ccode(&assignment.rhs)
        )
        .unwrap();
    }

    if options.braces {
        writeln!(out, "{pad}}}").unwrap();
    }

    out
}

/// Emits code writing each expression to the named grid function at the current point.
pub fn gridfunction_writes(
    params: &ParamRegistry,
    grid: &Grid,
    writes: &[(&str, Expr)],
) -> Result<String, GridError> {
    let assignments = writes
        .iter()
        .map(|(name, rhs)| Ok(Lhrh::new(grid.access(params, name)?, rhs.clone())))
        .collect::<Result<Vec<_>, GridError>>()?;

    let pad = " ".repeat(STEP);
    let mut out = String::new();
    writeln!(out, "{{").unwrap();
    writeln!(out, "{pad}/*").unwrap();
    writeln!(
        out,
        "{pad} * Finite Difference Code Generation, Step 1 of 1: Evaluate symbolic expressions and write to main memory:"
    )
    .unwrap();
    writeln!(out, "{pad} */").unwrap();
    out.push_str(&output_c(
        &assignments,
        &CodegenOptions {
            braces: false,
            indent: STEP,
            ..Default::default()
        },
    ));
    writeln!(out, "}}").unwrap();

    Ok(out)
}

/// Emits the members of the struct holding all C parameters.
pub fn declare_cparams_struct(params: &ParamRegistry) -> String {
    let mut out = String::new();
    for param in params.c_params() {
        let ty = param.ty();
        let name = &param.name;
        match ty {
            ParamType::Char => writeln!(out, "char {name}[100]; // {}", param.module).unwrap(),
            _ => writeln!(out, "{} {name}; // {}", ty.c_type(), param.module).unwrap(),
        }
    }
    out
}

/// Emits assignments of every C parameter to its current value.
pub fn set_cparams_default(params: &ParamRegistry) -> String {
    let mut out = String::new();
    for param in params.c_params() {
        match param.ty() {
            ParamType::Char => writeln!(
                out,
                "snprintf(params.{}, 100, {});",
                param.name,
                param.value.c_literal()
            )
            .unwrap(),
            _ => writeln!(
                out,
                "params.{} = {}; // {}",
                param.name,
                param.value.c_literal(),
                param.module
            )
            .unwrap(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridFunctionKind;
    use crate::params::ParamValue;

    #[test]
    fn assignment_block() {
        let x = Expr::symbol("xx0");
        let assignments = vec![
            Lhrh::new("a", x.clone()),
            Lhrh::new("b", Expr::pow(x.clone(), Expr::integer(2))),
        ];

        let code = output_c(&assignments, &CodegenOptions::default());
        let expected = "\
/*
 *  Original symbolic expressions:
 *  \"[a = xx0,
 *    b = xx0**2]\"
 */
{
   a = xx0;
   b = ((xx0)*(xx0));
}
";
        assert_eq!(code, expected);

        let code = output_c(
            &assignments[..1],
            &CodegenOptions {
                braces: false,
                comment: false,
                declare: Some("const REAL".to_string()),
                indent: 0,
            },
        );
        assert_eq!(code, "const REAL a = xx0;\n");
    }

    #[test]
    fn gridfunctions() {
        let mut params = ParamRegistry::new();
        let mut grid = Grid::register(&mut params).unwrap();
        grid.register_gridfunctions(GridFunctionKind::Evol, &["uu", "vv"])
            .unwrap();

        let code = gridfunction_writes(
            &params,
            &grid,
            &[("uu", Expr::symbol("uu_in")), ("vv", Expr::symbol("vv_in"))],
        )
        .unwrap();

        assert!(code.starts_with("{\n   /*\n"));
        assert!(code.contains("    *  \"[in_gfs[IDX4(UUGF, i0, i1, i2)] = uu_in,\n"));
        assert!(code.contains("    *    in_gfs[IDX4(VVGF, i0, i1, i2)] = vv_in]\"\n"));
        assert!(code.contains("   in_gfs[IDX4(UUGF, i0, i1, i2)] = uu_in;\n"));
        assert!(code.ends_with("   in_gfs[IDX4(VVGF, i0, i1, i2)] = vv_in;\n}\n"));

        assert_eq!(
            gridfunction_writes(&params, &grid, &[("ww", Expr::zero())]),
            Err(GridError::UnknownGridFunction("ww".to_string()))
        );
    }

    #[test]
    fn cparams() {
        let mut params = ParamRegistry::new();
        params.initialize("grid", "DIM", ParamValue::Int(3)).unwrap();
        params
            .c_parameters("wave", &["uu_in"], ParamValue::Real(0.5))
            .unwrap();
        params
            .c_parameter("wave", "label", ParamValue::Char("pulse".into()))
            .unwrap();

        assert_eq!(
            declare_cparams_struct(&params),
            "REAL uu_in; // wave\nchar label[100]; // wave\n"
        );
        assert_eq!(
            set_cparams_default(&params),
            "params.uu_in = 0.5; // wave\nsnprintf(params.label, 100, \"pulse\");\n"
        );
    }
}
