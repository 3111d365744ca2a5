mod formatters;

use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use formatters::{format_path, format_segments, format_value};

use crate::fragment::Fragment;
use crate::namespace::Namespace;

pub fn result_table(namespace: &Namespace) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

    for (path, value) in namespace.leaves() {
        table.add_row(vec![Cell::new(format_path(&path)), Cell::new(format_value(value))]);
    }
    table
}

pub fn keys_table(root: &Fragment) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Command").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Flat Key").add_attribute(Attribute::Bold),
            Cell::new("Field").add_attribute(Attribute::Bold),
        ]);

    let mut stack = vec![root];
    while let Some(fragment) = stack.pop() {
        for (key, name) in fragment.flat_keys() {
            table.add_row(vec![
                Cell::new(fragment.name()),
                Cell::new(format_segments(fragment.path().segments())),
                Cell::new(key),
                Cell::new(name),
            ]);
        }
        if let Some(dispatcher) = fragment.dispatcher() {
            let children: Vec<&Fragment> =
                dispatcher.subcommands().map(|(_, child)| child).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    table
}

pub fn print_result(namespace: &Namespace) {
    println!("{}", result_table(namespace));
}

pub fn print_unknown(unknown: &[String]) {
    if !unknown.is_empty() {
        println!("Unrecognised: {}", unknown.join(" "));
    }
}

pub fn print_keys(root: &Fragment) {
    println!("{}", keys_table(root));
}
