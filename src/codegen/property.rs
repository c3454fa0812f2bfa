use crate::db::{Column, Table};

const INDENT: &str = "\t\t";

/// Renders one column as a C# auto-property, preceded by its doc comment and
/// data-annotation markers. Primary keys are always surfaced as `Id`.
pub fn render_property(_table: &Table, column: &Column) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !column.comment.is_empty() {
        lines.push(format!("{INDENT}/// <summary>"));
        lines.push(format!("{INDENT}/// {}", column.comment));
        lines.push(format!("{INDENT}/// </summary>"));
    }

    if column.is_primary_key {
        lines.push(format!("{INDENT}[Key]"));
        lines.push(declaration(column.clr_type.as_str(), "Id"));
    } else {
        if !column.is_nullable {
            lines.push(format!("{INDENT}[Required]"));
        }

        let ty = if column.is_nullable && !column.clr_type.is_nullable_by_default() {
            format!("{}?", column.clr_type.as_str())
        } else {
            column.clr_type.as_str().to_string()
        };
        lines.push(declaration(&ty, &column.name));
    }

    let mut block = String::new();
    for line in lines {
        block.push_str(&line);
        block.push('\n');
    }
    block
}

fn declaration(ty: &str, name: &str) -> String {
    format!("{INDENT}public {ty} {name} {{get;set;}}")
}
