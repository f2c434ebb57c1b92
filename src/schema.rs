//! Declarations and the schema extractor.
//!
//! A configuration record implements [`Options`] and lists its fields,
//! groups and commands on a [`Describe`]. Groups and commands point at
//! nested records that implement `Options` themselves; their declarations
//! are lifted onto the parent record by composing accessors.
//!
//! [`extract`] walks the declaration depth-first and produces the
//! descriptor arena the parser runs on:
//!
//! - flattened groups contribute their fields to the enclosing scope as-is;
//! - namespaced groups prefix long names with `namespace` plus the namespace
//!   delimiter and env names with `env_namespace` plus the env delimiter,
//!   composing along the path;
//! - commands open a new scope with its own registry.

use tracing::trace;

use crate::command::{CommandSlot, Commander, DirectCommand, LiftedCommand};
use crate::error::FlagfigError;
use crate::field::Field;
use crate::registry::Scope;
use crate::types::OptionStyle;

/// A record that can be populated from the command line.
///
/// ```ignore
/// impl Options for Opts {
///     fn describe(d: &mut Describe<Self>) {
///         d.field(Field::new("verbose", |o: &mut Self| &mut o.verbose).short('v'));
///         d.group(Group::new("Server", |o: &mut Self| &mut o.server).namespace("server"));
///         d.command(Command::new("add", |o: &mut Self| &mut o.add));
///     }
/// }
/// ```
pub trait Options: Sized + 'static {
    fn describe(d: &mut Describe<Self>);
}

/// Collects the declarations of one record.
pub struct Describe<C> {
    fields: Vec<Field<C>>,
    groups: Vec<Group<C>>,
    commands: Vec<Command<C>>,
    subcommands_optional: bool,
}

impl<C: 'static> Describe<C> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            groups: Vec::new(),
            commands: Vec::new(),
            subcommands_optional: false,
        }
    }

    pub(crate) fn of() -> Self
    where
        C: Options,
    {
        let mut d = Self::new();
        C::describe(&mut d);
        d
    }

    pub fn field(&mut self, field: Field<C>) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn group(&mut self, group: Group<C>) -> &mut Self {
        self.groups.push(group);
        self
    }

    pub fn command(&mut self, command: Command<C>) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Allow this record's scope to be used without choosing a command.
    pub fn subcommands_optional(&mut self) -> &mut Self {
        self.subcommands_optional = true;
        self
    }

    fn lift<P: 'static>(self, access: fn(&mut P) -> &mut C) -> Describe<P> {
        Describe {
            fields: self.fields.into_iter().map(|f| f.lift(access)).collect(),
            groups: self.groups.into_iter().map(|g| g.lift(access)).collect(),
            commands: self.commands.into_iter().map(|c| c.lift(access)).collect(),
            subcommands_optional: self.subcommands_optional,
        }
    }
}

/// A nested record whose fields join the enclosing scope.
pub struct Group<C> {
    name: String,
    namespace: Option<String>,
    env_namespace: Option<String>,
    contents: Describe<C>,
}

impl<C: 'static> Group<C> {
    pub fn new<G: Options>(name: &str, access: fn(&mut C) -> &mut G) -> Self {
        Self {
            name: name.to_string(),
            namespace: None,
            env_namespace: None,
            contents: Describe::<G>::of().lift(access),
        }
    }

    /// A group without a name of its own, whose fields read as if declared
    /// on the parent.
    pub fn flatten<G: Options>(access: fn(&mut C) -> &mut G) -> Self {
        Self::new("", access)
    }

    /// Prefix for the long names of every field in the group.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Prefix for the environment variables of every field in the group.
    pub fn env_namespace(mut self, namespace: &str) -> Self {
        self.env_namespace = Some(namespace.to_string());
        self
    }

    fn lift<P: 'static>(self, access: fn(&mut P) -> &mut C) -> Group<P> {
        Group {
            name: self.name,
            namespace: self.namespace,
            env_namespace: self.env_namespace,
            contents: self.contents.lift(access),
        }
    }
}

/// A named subcommand with its own option scope.
pub struct Command<C> {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    hidden: bool,
    slot: Box<dyn CommandSlot<C>>,
    contents: Describe<C>,
}

impl<C: 'static> Command<C> {
    pub fn new<G: Options + Commander>(name: &str, access: fn(&mut C) -> &mut G) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            hidden: false,
            slot: Box::new(DirectCommand { access }),
            contents: Describe::<G>::of().lift(access),
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Allow this command to be used without one of its own subcommands.
    pub fn subcommands_optional(mut self) -> Self {
        self.contents.subcommands_optional = true;
        self
    }

    fn lift<P: 'static>(self, access: fn(&mut P) -> &mut C) -> Command<P> {
        Command {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            hidden: self.hidden,
            slot: Box::new(LiftedCommand {
                access,
                inner: self.slot,
            }),
            contents: self.contents.lift(access),
        }
    }
}

/// One field in the arena.
pub(crate) struct FieldEntry<C> {
    pub(crate) field: Field<C>,
    /// Spelling used in messages, e.g. `--nested.foo`.
    pub(crate) flag: String,
    /// Name of the innermost enclosing group, if any.
    pub(crate) group: Option<String>,
}

/// One command in the arena.
pub(crate) struct CommandEntry<C> {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) slot: Box<dyn CommandSlot<C>>,
    /// The scope this command opens.
    pub(crate) scope: usize,
}

/// Naming knobs that affect extraction.
#[derive(Debug, Clone)]
pub(crate) struct ExtractSettings {
    pub(crate) style: OptionStyle,
    pub(crate) namespace_delimiter: String,
    pub(crate) env_namespace_delimiter: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            style: OptionStyle::default(),
            namespace_delimiter: ".".into(),
            env_namespace_delimiter: "_".into(),
        }
    }
}

/// The normalized descriptor tree, flattened into an arena.
pub(crate) struct Schema<C> {
    pub(crate) fields: Vec<FieldEntry<C>>,
    pub(crate) commands: Vec<CommandEntry<C>>,
    /// Index 0 is the root scope.
    pub(crate) scopes: Vec<Scope>,
}

#[derive(Default, Clone)]
struct Prefix {
    long: String,
    env: String,
    group: Option<String>,
}

/// Build the arena for `C`, validating every declaration.
pub(crate) fn extract<C: Options>(settings: &ExtractSettings) -> Result<Schema<C>, FlagfigError> {
    let root = Describe::<C>::of();
    let mut schema = Schema {
        fields: Vec::new(),
        commands: Vec::new(),
        scopes: vec![Scope::root(root.subcommands_optional)],
    };
    schema.add(root, 0, &Prefix::default(), settings)?;
    Ok(schema)
}

impl<C: 'static> Schema<C> {
    fn add(
        &mut self,
        contents: Describe<C>,
        scope: usize,
        prefix: &Prefix,
        settings: &ExtractSettings,
    ) -> Result<(), FlagfigError> {
        let Describe {
            fields,
            groups,
            commands,
            ..
        } = contents;

        for mut field in fields {
            if let Some(long) = field.spec.long.take() {
                field.spec.long = Some(format!("{}{long}", prefix.long));
            }
            if let Some(env) = field.spec.env.take() {
                field.spec.env = Some(format!("{}{env}", prefix.env));
            }
            field.validate_declaration(settings.style)?;

            let id = self.fields.len();
            self.scopes[scope].register_field(id, &field.spec)?;
            let flag = field.spec.display_name(settings.style);
            trace!(flag = %flag, scope, "registered field");
            self.fields.push(FieldEntry {
                field,
                flag,
                group: prefix.group.clone(),
            });
        }

        for group in groups {
            let mut nested = prefix.clone();
            if let Some(ns) = &group.namespace {
                nested.long = format!("{}{ns}{}", prefix.long, settings.namespace_delimiter);
            }
            if let Some(ns) = &group.env_namespace {
                nested.env = format!("{}{ns}{}", prefix.env, settings.env_namespace_delimiter);
            }
            if !group.name.is_empty() {
                nested.group = Some(group.name.clone());
            }
            self.add(group.contents, scope, &nested, settings)?;
        }

        for command in commands {
            let id = self.commands.len();
            let child = self.scopes.len();
            let mut path = self.scopes[scope].path.clone();
            path.push(command.name.clone());

            self.scopes[scope].register_command(id, &command.name, &command.aliases)?;
            self.scopes
                .push(Scope::command(path, command.contents.subcommands_optional));
            self.commands.push(CommandEntry {
                name: command.name,
                aliases: command.aliases,
                description: command.description,
                hidden: command.hidden,
                slot: command.slot,
                scope: child,
            });
            // Namespaces do not reach into a command's own scope.
            self.add(command.contents, child, &Prefix::default(), settings)?;
        }
        Ok(())
    }
}
