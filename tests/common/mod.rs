#![allow(dead_code)]

use clap::Arg;
use nestargs::{
    DispatcherOptions, Entry, Fragment, Namespace, SubcommandOptions, Value, ValueKind,
};

pub fn value_at<'a>(ns: &'a Namespace, path: &[&str]) -> &'a Value {
    ns.lookup(path)
        .and_then(Entry::as_value)
        .unwrap_or_else(|| panic!("no value at {}", path.join(".")))
}

pub fn level_fragment(name: &str, level: i64) -> Fragment {
    let mut fragment = Fragment::new(name.to_string());
    fragment
        .add_argument(
            Arg::new("level").long("level").default_value(level.to_string()),
            ValueKind::Integer,
        )
        .expect("register level")
        .add_argument(Arg::new("some_flag").long("some_flag"), ValueKind::Text)
        .expect("register some_flag");
    fragment
}

/// main > sub_1 > sub_2 > sub_3, each level built standalone and attached.
pub fn multinest() -> Fragment {
    let sub_3 = level_fragment("sub_3", 3);

    let mut sub_2 = level_fragment("sub_2", 2);
    sub_2
        .add_subcommands(DispatcherOptions::default().dest("sub"))
        .expect("dispatcher")
        .attach("sub_3", sub_3, SubcommandOptions::default())
        .expect("attach sub_3");

    let mut sub_1 = level_fragment("sub_1", 1);
    sub_1
        .add_subcommands(DispatcherOptions::default().dest("sub"))
        .expect("dispatcher")
        .attach("sub_2", sub_2, SubcommandOptions::default())
        .expect("attach sub_2");

    let mut main = level_fragment("main", 0);
    main.add_subcommands(DispatcherOptions::default().dest("sub"))
        .expect("dispatcher")
        .attach("sub_1", sub_1, SubcommandOptions::default())
        .expect("attach sub_1");
    main
}

pub fn drink_template() -> Fragment {
    let mut drink = Fragment::new("drink");
    drink
        .add_argument(
            Arg::new("speed")
                .long("speed")
                .default_value("fast")
                .value_parser(["fast", "slow", "MEGA"]),
            ValueKind::Text,
        )
        .expect("register speed");
    drink
}

/// The boba shop: root flags, a `drink` subcommand from a template and a fresh `make`.
pub fn boba() -> Fragment {
    let mut main = Fragment::new("boba");
    main.add_argument(Arg::new("hasTapioca").long("with-tapioca"), ValueKind::Flag)
        .expect("register hasTapioca")
        .add_argument(
            Arg::new("sugar-level").long("sugar-level").default_value("75"),
            ValueKind::Integer,
        )
        .expect("register sugar_level");

    let dispatcher = main
        .add_subcommands(DispatcherOptions::default().dest("command").required(true))
        .expect("dispatcher");

    dispatcher
        .attach("drink", drink_template(), SubcommandOptions::default())
        .expect("attach drink")
        .add_argument(Arg::new("amount").long("amount").required(true), ValueKind::Integer)
        .expect("register amount");

    dispatcher
        .add_subcommand("make", SubcommandOptions::default())
        .expect("add make")
        .add_argument(Arg::new("hasTapioca").long("with-tapioca"), ValueKind::Flag)
        .expect("register hasTapioca")
        .add_argument(
            Arg::new("sugar-level").long("sugar-level").default_value("100"),
            ValueKind::Integer,
        )
        .expect("register sugar_level");

    main
}
