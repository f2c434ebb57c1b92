//! Serializable description of a parser's options and commands.
//!
//! Help, man-page and completion renderers work from this description rather
//! than from the parser internals. Hidden options and commands are left out.

use serde::Serialize;

use crate::parser::Parser;
use crate::schema::Schema;
use crate::types::OptionStyle;
use crate::value::Kind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    pub style: OptionStyle,
    pub subcommands_optional: bool,
    pub options: Vec<OptionDescription>,
    pub commands: Vec<CommandDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDescription {
    pub name: String,
    /// As spelled on the command line, e.g. `--nested.foo`.
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    pub kind: Kind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_values: Vec<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDescription {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subcommands_optional: bool,
    pub options: Vec<OptionDescription>,
    pub commands: Vec<CommandDescription>,
}

impl<C: 'static> Parser<C> {
    /// Describe the visible options and commands.
    pub fn describe(&self) -> Description {
        let schema = &self.schema;
        Description {
            style: self.settings.style,
            subcommands_optional: schema.scopes[0].subcommands_optional,
            options: options(schema, 0),
            commands: commands(schema, 0),
        }
    }

    /// [`describe`](Self::describe), rendered as pretty-printed JSON.
    pub fn describe_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.describe())
    }
}

fn options<C: 'static>(schema: &Schema<C>, scope: usize) -> Vec<OptionDescription> {
    schema.scopes[scope]
        .fields
        .iter()
        .map(|&id| &schema.fields[id])
        .filter(|entry| !entry.field.spec.hidden)
        .map(|entry| {
            let spec = &entry.field.spec;
            OptionDescription {
                name: spec.name.clone(),
                flag: entry.flag.clone(),
                long: spec.long.clone(),
                short: spec.short,
                env: spec.env.clone(),
                kind: entry.field.kind(),
                defaults: spec.defaults.clone(),
                choices: spec.choices.clone(),
                optional_values: spec.optional_values.clone(),
                required: spec.required,
                group: entry.group.clone(),
                description: spec.description.clone(),
                value_name: spec.value_name.clone(),
            }
        })
        .collect()
}

fn commands<C: 'static>(schema: &Schema<C>, scope: usize) -> Vec<CommandDescription> {
    schema.scopes[scope]
        .commands
        .iter()
        .map(|&id| &schema.commands[id])
        .filter(|command| !command.hidden)
        .map(|command| CommandDescription {
            name: command.name.clone(),
            aliases: command.aliases.clone(),
            description: command.description.clone(),
            subcommands_optional: schema.scopes[command.scope].subcommands_optional,
            options: options(schema, command.scope),
            commands: commands(schema, command.scope),
        })
        .collect()
}
