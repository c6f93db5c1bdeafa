use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::info;

use crate::alias::AliasTable;
use crate::parse::parse;
use crate::types::OutputDef;
use crate::{BuildError, Engine, Expr, OutputRule};

pub(crate) fn compile(
    outputs: &[OutputDef],
    aliases: &AliasTable,
    resync_interval: Duration,
) -> Result<Engine, BuildError> {
    check_outputs(outputs)?;

    let rules = outputs
        .iter()
        .map(|def| compile_output(def, aliases))
        .collect::<Result<Vec<_>, _>>()?;

    let dependents = dependency_index(&rules);
    let output_index = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| (rule.output().to_owned(), i))
        .collect();

    for rule in &rules {
        info!(
            "{} affected by {} input entities",
            rule.output(),
            rule.entities().len()
        );
    }
    info!("Listening to {} inputs total.", dependents.len());

    Ok(Engine {
        rules,
        dependents,
        outputs: output_index,
        resync_interval,
    })
}

fn check_outputs(outputs: &[OutputDef]) -> Result<(), BuildError> {
    if outputs.is_empty() {
        return Err(BuildError::NoOutputs);
    }
    let mut seen = HashSet::new();
    for def in outputs {
        if !seen.insert(def.output.as_str()) {
            return Err(BuildError::DuplicateOutput {
                output: def.output.clone(),
            });
        }
        if def.inputs.is_empty() {
            return Err(BuildError::NoInputs {
                output: def.output.clone(),
            });
        }
    }
    Ok(())
}

fn compile_output(def: &OutputDef, aliases: &AliasTable) -> Result<OutputRule, BuildError> {
    let inputs = def
        .inputs
        .iter()
        .map(|raw| compile_input(&def.output, raw, aliases))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OutputRule::new(&def.output, inputs))
}

fn compile_input(output: &str, raw: &str, aliases: &AliasTable) -> Result<Expr, BuildError> {
    let expr = parse(raw).map_err(|source| BuildError::Expression {
        origin: format!("'{raw}' for output '{output}'"),
        source,
    })?;
    aliases.resolve(&expr).map_err(|source| BuildError::Alias {
        output: output.to_owned(),
        source,
    })
}

/// entity -> rules referencing it, each rule listed once, in rule order.
fn dependency_index(rules: &[OutputRule]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, rule) in rules.iter().enumerate() {
        for entity in rule.entities() {
            index.entry(entity.clone()).or_default().push(i);
        }
    }
    index
}
