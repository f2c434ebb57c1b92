#[cfg(test)]
pub mod test {
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    use crate::command::Commander;
    use crate::error::BoxError;
    use crate::field::Field;
    use crate::schema::{Command, Describe, Group, Options};
    use crate::value::Unmarshal;

    // -- Plain records for field-level tests ------------------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct Outer {
        pub level: i32,
        pub mode: String,
        pub verbose: bool,
        pub flag: Flag,
        pub inner: Inner,
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Inner {
        pub name: String,
    }

    /// Custom type that only accepts `-1` and `-foo`.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Flag(pub String);

    impl Unmarshal for Flag {
        fn unmarshal_flag(&mut self, value: &str) -> Result<(), String> {
            self.0 = value.to_string();
            Ok(())
        }

        fn is_valid_value(value: &str) -> Option<Result<(), String>> {
            Some(match value {
                "-1" | "-foo" => Ok(()),
                _ => Err("invalid flag value".to_string()),
            })
        }
    }

    #[derive(Debug, Default)]
    pub struct Shape {
        pub sides: u32,
        pub filled: bool,
    }

    impl Options for Shape {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("sides", |o: &mut Self| &mut o.sides).long("sides"))
                .field(Field::new("filled", |o: &mut Self| &mut o.filled).short('f'));
        }
    }

    // -- Defaults, env bindings and every value shape ----------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct DefaultOptions {
        pub int: i64,
        pub int_default: i64,
        pub float: f64,
        pub float_default: f64,
        pub numeric_flag: bool,
        pub string: String,
        pub string_default: String,
        pub string_not_unquoted: String,
        pub time: Duration,
        pub time_default: Duration,
        pub map: HashMap<String, i64>,
        pub map_default: HashMap<String, i64>,
        pub slice: Vec<i64>,
        pub slice_default: Vec<i64>,
    }

    impl Options for DefaultOptions {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("int", |o: &mut Self| &mut o.int).long("i").env("ENV_I"))
                .field(
                    Field::new("int_default", |o: &mut Self| &mut o.int_default)
                        .long("id")
                        .default("1")
                        .env("ENV_ID"),
                )
                .field(Field::new("float", |o: &mut Self| &mut o.float).long("f").env("ENV_F"))
                .field(
                    Field::new("float_default", |o: &mut Self| &mut o.float_default)
                        .long("fd")
                        .default("-3.14")
                        .env("ENV_FD"),
                )
                .field(
                    Field::new("numeric_flag", |o: &mut Self| &mut o.numeric_flag)
                        .short('3')
                        .env("ENV_3"),
                )
                .field(
                    Field::new("string", |o: &mut Self| &mut o.string)
                        .long("str")
                        .env("ENV_STR"),
                )
                .field(
                    Field::new("string_default", |o: &mut Self| &mut o.string_default)
                        .long("strd")
                        .default("abc")
                        .env("ENV_STRD"),
                )
                .field(
                    Field::new("string_not_unquoted", |o: &mut Self| &mut o.string_not_unquoted)
                        .long("strnot")
                        .unquote(false)
                        .env("ENV_STRNOT"),
                )
                .field(Field::new("time", |o: &mut Self| &mut o.time).long("t").env("ENV_T"))
                .field(
                    Field::new("time_default", |o: &mut Self| &mut o.time_default)
                        .long("td")
                        .default("1m")
                        .env("ENV_TD"),
                )
                .field(Field::new("map", |o: &mut Self| &mut o.map).long("m").env("ENV_M"))
                .field(
                    Field::new("map_default", |o: &mut Self| &mut o.map_default)
                        .long("md")
                        .default("a:1")
                        .env("ENV_MD"),
                )
                .field(
                    Field::new("slice", |o: &mut Self| &mut o.slice)
                        .long("s")
                        .env("ENV_S")
                        .env_delim(','),
                )
                .field(
                    Field::new("slice_default", |o: &mut Self| &mut o.slice_default)
                        .long("sd")
                        .default("1")
                        .default("2")
                        .env("ENV_SD")
                        .env_delim(','),
                );
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct EnvDefaultOptions {
        pub int: i64,
        pub time: Duration,
        pub map: BTreeMap<String, i64>,
        pub slice: Vec<i64>,
        pub nested: EnvNestedOptions,
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct EnvNestedOptions {
        pub foo: String,
    }

    impl Options for EnvNestedOptions {
        fn describe(d: &mut Describe<Self>) {
            d.field(
                Field::new("foo", |o: &mut Self| &mut o.foo)
                    .long("foo")
                    .default("z")
                    .env("FOO"),
            );
        }
    }

    impl Options for EnvDefaultOptions {
        fn describe(d: &mut Describe<Self>) {
            d.field(
                Field::new("int", |o: &mut Self| &mut o.int)
                    .long("i")
                    .default("1")
                    .env("TEST_I"),
            )
            .field(
                Field::new("time", |o: &mut Self| &mut o.time)
                    .long("t")
                    .default("1m")
                    .env("TEST_T"),
            )
            .field(
                Field::new("map", |o: &mut Self| &mut o.map)
                    .long("m")
                    .default("a:1")
                    .env("TEST_M")
                    .env_delim(';'),
            )
            .field(
                Field::new("slice", |o: &mut Self| &mut o.slice)
                    .long("s")
                    .default("1")
                    .default("2")
                    .env("TEST_S")
                    .env_delim(','),
            )
            .group(
                Group::new("nested", |o: &mut Self| &mut o.nested)
                    .namespace("nested")
                    .env_namespace("NESTED"),
            );
        }
    }

    // -- Values that look like options -------------------------------------------

    #[derive(Debug, Default)]
    pub struct OptionAsArgument {
        pub string_slice: Vec<String>,
        pub int_slice: Vec<i64>,
        pub int16: i16,
        pub float32: f32,
        pub float32_opt: Option<f32>,
        pub other_option: bool,
        pub custom: Flag,
    }

    impl Options for OptionAsArgument {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("string_slice", |o: &mut Self| &mut o.string_slice).long("string-slice"))
                .field(Field::new("int_slice", |o: &mut Self| &mut o.int_slice).long("int-slice"))
                .field(Field::new("int16", |o: &mut Self| &mut o.int16).long("int16"))
                .field(Field::new("float32", |o: &mut Self| &mut o.float32).long("float32"))
                .field(
                    Field::new("float32_opt", |o: &mut Self| &mut o.float32_opt)
                        .long("float32ptr"),
                )
                .field(
                    Field::new("other_option", |o: &mut Self| &mut o.other_option)
                        .long("other-option")
                        .short('o'),
                )
                .field(
                    Field::custom("custom", |o: &mut Self| &mut o.custom)
                        .long("custom-flag")
                        .short('c'),
                );
        }
    }

    // -- Groups: flattened and namespaced ----------------------------------------

    #[derive(Debug, Default)]
    pub struct NamespacedOptions {
        pub verbose: bool,
        pub embedded: Embedded,
        pub nested: Nested,
    }

    #[derive(Debug, Default)]
    pub struct Embedded {
        pub embedded: String,
        pub v: bool,
    }

    #[derive(Debug, Default)]
    pub struct Nested {
        pub foo: String,
        pub deeper: Deeper,
    }

    #[derive(Debug, Default)]
    pub struct Deeper {
        pub bar: i32,
    }

    impl Options for Embedded {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("embedded", |o: &mut Self| &mut o.embedded).long("embedded"))
                .field(Field::new("v", |o: &mut Self| &mut o.v).short('v'));
        }
    }

    impl Options for Deeper {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("bar", |o: &mut Self| &mut o.bar).long("bar").env("BAR"));
        }
    }

    impl Options for Nested {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("foo", |o: &mut Self| &mut o.foo).long("foo").env("FOO"))
                .group(
                    Group::new("Deeper", |o: &mut Self| &mut o.deeper)
                        .namespace("deeper")
                        .env_namespace("DEEPER"),
                );
        }
    }

    impl Options for NamespacedOptions {
        fn describe(d: &mut Describe<Self>) {
            d.field(Field::new("verbose", |o: &mut Self| &mut o.verbose).long("verbose"))
                .group(Group::flatten(|o: &mut Self| &mut o.embedded))
                .group(
                    Group::new("Nested", |o: &mut Self| &mut o.nested)
                        .namespace("nested")
                        .env_namespace("NESTED"),
                );
        }
    }

    // -- Command tree ------------------------------------------------------------

    #[derive(Debug, Default)]
    pub struct GitLike {
        pub verbose: bool,
        pub add: AddCommand,
        pub remote: RemoteCommand,
    }

    #[derive(Debug, Default)]
    pub struct AddCommand {
        pub force: bool,
        pub name: String,
        pub executed: Option<Vec<String>>,
    }

    #[derive(Debug, Default)]
    pub struct RemoteCommand {
        pub show: ShowCommand,
    }

    #[derive(Debug, Default)]
    pub struct ShowCommand {
        pub executed: Option<Vec<String>>,
    }

    impl Options for AddCommand {
        fn describe(d: &mut Describe<Self>) {
            d.field(
                Field::new("force", |o: &mut Self| &mut o.force)
                    .long("force")
                    .short('f'),
            )
            .field(Field::new("name", |o: &mut Self| &mut o.name).long("name").short('n'));
        }
    }

    impl Commander for AddCommand {
        fn execute(&mut self, args: &[String]) -> Result<(), BoxError> {
            if args.iter().any(|a| a == "fail") {
                return Err("add failed".into());
            }
            self.executed = Some(args.to_vec());
            Ok(())
        }
    }

    impl Options for ShowCommand {
        fn describe(_d: &mut Describe<Self>) {}
    }

    impl Commander for ShowCommand {
        fn execute(&mut self, args: &[String]) -> Result<(), BoxError> {
            self.executed = Some(args.to_vec());
            Ok(())
        }
    }

    impl Options for RemoteCommand {
        fn describe(d: &mut Describe<Self>) {
            d.command(Command::new("show", |o: &mut Self| &mut o.show));
        }
    }

    impl Commander for RemoteCommand {}

    impl Options for GitLike {
        fn describe(d: &mut Describe<Self>) {
            d.field(
                Field::new("verbose", |o: &mut Self| &mut o.verbose)
                    .long("verbose")
                    .short('v'),
            )
            .command(
                Command::new("add", |o: &mut Self| &mut o.add)
                    .alias("a")
                    .description("Add a file"),
            )
            .command(Command::new("remote", |o: &mut Self| &mut o.remote).hidden());
        }
    }
}
