//! Template compiler: recipe source in, `ServiceTemplate` out.
//!
//! Pure function of the recipe text plus the template directory it came
//! from. No partial result is ever returned.

use std::collections::BTreeMap;
use std::path::Path;

use svcforge_common::labels;
use svcforge_common::{
    Argument, DEFAULT_HOOK_IMAGE, IMAGE_ARGUMENT, ServiceHooks, ServiceImage, ServicePorts,
    ServiceTemplate, Volume,
};

use crate::domain::error::CompileError;
use crate::domain::naming::volume_alias;
use crate::domain::recipe::{self, Directive, split_assignment, unquote};
use crate::domain::render::TemplateEngine;

/// Compile a recipe into a service template.
///
/// # Errors
///
/// Returns a `CompileError` for malformed syntax, multi-valued `ARG`,
/// `VOLUME` or `LABEL` directives, invalid namespace keys, untyped label
/// values, or missing required labels.
pub fn compile(
    source: &str,
    template_path: &Path,
    vendored: bool,
) -> Result<ServiceTemplate, CompileError> {
    let directives = recipe::parse(source)?;
    let mut engine = TemplateEngine::new();

    let mut labels_seen: BTreeMap<String, String> = BTreeMap::new();
    let mut arguments: Vec<Argument> = Vec::new();
    let mut volumes: Vec<Volume> = Vec::new();

    for directive in &directives {
        match directive.instruction.as_str() {
            "LABEL" => {
                let (key, value) = label(directive)?;
                labels_seen.insert(key, value);
            }
            "ARG" => {
                let argument = argument(directive, &mut engine)?;
                if arguments.iter().any(|a| a.name == argument.name) {
                    return Err(CompileError::DuplicateArgument(argument.name));
                }
                arguments.push(argument);
            }
            "VOLUME" => {
                let volume = volume(directive)?;
                if let Some(existing) = volumes.iter().find(|v| v.alias == volume.alias) {
                    return Err(CompileError::DuplicateVolume {
                        alias: volume.alias,
                        path: format!("{} and {}", existing.container_path, volume.container_path),
                    });
                }
                volumes.push(volume);
            }
            _ => {}
        }
    }

    let lookup = |key: &str| labels_seen.get(key).filter(|v| !v.is_empty()).cloned();

    let name = lookup(labels::NAME).ok_or(CompileError::MissingLabel(labels::NAME))?;
    let description =
        lookup(labels::DESCRIPTION).ok_or(CompileError::MissingLabel(labels::DESCRIPTION))?;

    let hooks = ServiceHooks {
        image: lookup(labels::HOOKS_IMAGE).unwrap_or_else(|| DEFAULT_HOOK_IMAGE.to_string()),
        pre_create: parse_bool(labels::HOOKS_PRE_CREATE, lookup(labels::HOOKS_PRE_CREATE))?,
        post_create: parse_bool(labels::HOOKS_POST_CREATE, lookup(labels::HOOKS_POST_CREATE))?,
        post_start: parse_bool(labels::HOOKS_POST_START, lookup(labels::HOOKS_POST_START))?,
    };

    let ports = ServicePorts {
        expose: parse_ports(labels::PORTS_EXPOSE, lookup(labels::PORTS_EXPOSE))?,
        wait: parse_ports(labels::PORTS_WAIT, lookup(labels::PORTS_WAIT))?,
    };

    let commands = labels::COMMAND_LABELS
        .iter()
        .filter_map(|(key, command)| lookup(*key).map(|v| ((*command).to_string(), v)))
        .collect();

    let mut exported_variables = BTreeMap::new();
    let mut mapped_variables = BTreeMap::new();
    for (key, value) in &labels_seen {
        if let Some(var) = labels::exported_variable(key) {
            exported_variables.insert(var.to_string(), value.clone());
        } else if let Some(var) = labels::mapped_variable(key) {
            mapped_variables.insert(var.to_string(), value.clone());
        }
    }

    let image = arguments
        .iter()
        .find(|a| a.name == IMAGE_ARGUMENT)
        .map(|a| ServiceImage::parse(&a.value))
        .unwrap_or_default();

    Ok(ServiceTemplate {
        name,
        image,
        description,
        arguments,
        hooks,
        exported_variables,
        mapped_variables,
        commands,
        ports,
        volumes,
        path: template_path.to_path_buf(),
        vendored,
    })
}

fn label(directive: &Directive) -> Result<(String, String), CompileError> {
    let mut pairs = directive.pairs()?;
    if pairs.len() > 1 {
        return Err(CompileError::MultipleValues {
            line: directive.line,
            instruction: directive.instruction.clone(),
        });
    }
    let Some((key, raw)) = pairs.pop() else {
        return Err(CompileError::Syntax {
            line: directive.line,
            message: "LABEL requires a key".to_string(),
        });
    };
    if labels::in_namespace(&key) && !labels::is_valid(&key) {
        return Err(CompileError::InvalidLabelKey(key));
    }
    Ok((key, unquote(&raw)))
}

fn argument(directive: &Directive, engine: &mut TemplateEngine) -> Result<Argument, CompileError> {
    let words = directive.words()?;
    let [word] = words.as_slice() else {
        return Err(CompileError::MultipleValues {
            line: directive.line,
            instruction: directive.instruction.clone(),
        });
    };

    let Some((name, raw)) = split_assignment(word) else {
        return Ok(Argument {
            name: word.clone(),
            template: String::new(),
            value: String::new(),
            is_variable: false,
        });
    };

    let template = unquote(raw);
    let value = engine
        .render_static(&template)
        .map_err(|source| CompileError::Render {
            name: name.to_string(),
            source,
        })?;
    Ok(Argument {
        name: name.to_string(),
        is_variable: template != value,
        template,
        value,
    })
}

fn volume(directive: &Directive) -> Result<Volume, CompileError> {
    let values = directive.list()?;
    let [path] = values.as_slice() else {
        return Err(CompileError::MultipleValues {
            line: directive.line,
            instruction: directive.instruction.clone(),
        });
    };
    let path = unquote(path);
    Ok(Volume {
        alias: volume_alias(&path),
        container_path: path,
    })
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<bool, CompileError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(CompileError::InvalidBool { key, value }),
    }
}

fn parse_ports(key: &'static str, value: Option<String>) -> Result<Vec<u16>, CompileError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<u16>().map_err(|_| CompileError::InvalidPort {
                key,
                value: token.to_string(),
            })
        })
        .collect()
}
