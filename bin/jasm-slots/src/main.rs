use jasm::assemble::ast::{MethodDefinition, MethodParameter};
use jasm::assemble::variables::VariableTable;
use jasm::jvm::{BinaryName, MethodAccessFlags, MethodDescriptor, Name, ParseDescriptor};

use clap::{crate_version, Arg, ArgAction, Command};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let matches = Command::new("Local variable slot layout")
        .version(crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Print the local variable slots taken up by a method's receiver and parameters")
        .arg(
            Arg::new("owner")
                .long("owner")
                .value_name("CLASS_NAME")
                .default_value("java/lang/Object")
                .help("Class declaring the method (eg. `foo/bar/Baz`)"),
        )
        .arg(
            Arg::new("static")
                .long("static")
                .action(ArgAction::SetTrue)
                .help("The method is static, so there is no `this`"),
        )
        .arg(
            Arg::new("DESCRIPTOR")
                .help("Method descriptor (eg. `(JLjava/lang/String;)V`)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("NAMES")
                .help("Parameter names (defaults to `arg0`, `arg1`, ...)")
                .num_args(0..)
                .index(2),
        )
        .get_matches();

    let owner = BinaryName::from_string(matches.get_one::<String>("owner").unwrap().clone())?;
    let descriptor = MethodDescriptor::parse(matches.get_one::<String>("DESCRIPTOR").unwrap())?;
    let names: Vec<&String> = matches
        .get_many::<String>("NAMES")
        .map(|names| names.collect())
        .unwrap_or_default();
    if names.len() > descriptor.parameters.len() {
        let msg = format!(
            "{} names given for {} parameters",
            names.len(),
            descriptor.parameters.len()
        );
        return Err(msg.into());
    }

    let parameters = descriptor
        .parameters
        .iter()
        .enumerate()
        .map(|(idx, field_type)| {
            let name = names
                .get(idx)
                .map_or_else(|| format!("arg{}", idx), |name| name.to_string());
            MethodParameter::new(name, field_type.clone())
        })
        .collect();
    let mut access_flags = MethodAccessFlags::PUBLIC;
    if matches.get_flag("static") {
        access_flags |= MethodAccessFlags::STATIC;
    }
    let definition = MethodDefinition::new(
        "method",
        access_flags,
        parameters,
        descriptor.return_type.clone(),
    );

    let mut table = VariableTable::new();
    table.visit_definition(&owner, &definition)?;
    table.visit_params(&definition)?;
    log::info!("Laid out {} variables", table.len());

    for record in &table {
        let wide = if record.is_wide() { " (wide)" } else { "" };
        println!(
            "{:>5}  {:<24} {}{}",
            record.slot(),
            record.name(),
            record.last_used_type(),
            wide
        );
    }
    println!("max_locals = {}", table.max_locals());

    Ok(())
}
