//! Label keys recognized inside the `com.svcforge.template.*` namespace.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Every template label key starts with this prefix.
pub const NAMESPACE: &str = "com.svcforge.template.";

pub const NAME: &str = "com.svcforge.template.name";
pub const DESCRIPTION: &str = "com.svcforge.template.description";
pub const COMMANDS_CONNECT: &str = "com.svcforge.template.config.commands.connect";
pub const COMMANDS_ENTER: &str = "com.svcforge.template.config.commands.enter";
pub const COMMANDS_EXPORT: &str = "com.svcforge.template.config.commands.export";
pub const COMMANDS_IMPORT: &str = "com.svcforge.template.config.commands.import";
pub const HOOKS_IMAGE: &str = "com.svcforge.template.config.hooks.image";
pub const HOOKS_PRE_CREATE: &str = "com.svcforge.template.config.hooks.pre-create";
pub const HOOKS_POST_CREATE: &str = "com.svcforge.template.config.hooks.post-create";
pub const HOOKS_POST_START: &str = "com.svcforge.template.config.hooks.post-start";
pub const PORTS_EXPOSE: &str = "com.svcforge.template.config.ports.expose";
pub const PORTS_WAIT: &str = "com.svcforge.template.config.ports.wait";

/// Wildcard family: `<prefix>.<VARIABLE>`.
pub const VARIABLES_EXPORTED: &str = "com.svcforge.template.config.variables.exported";
/// Wildcard family: `<prefix>.<variable>`.
pub const VARIABLES_MAPPED: &str = "com.svcforge.template.config.variables.mapped";

/// Label attached to created containers recording the volume mode.
pub const SERVICE_VOLUMES: &str = "com.svcforge.service-volumes";

/// Command labels paired with the command name they register.
pub const COMMAND_LABELS: [(&str, &str); 4] = [
    (COMMANDS_CONNECT, "connect"),
    (COMMANDS_ENTER, "enter"),
    (COMMANDS_EXPORT, "export"),
    (COMMANDS_IMPORT, "import"),
];

static VALID_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        NAME,
        DESCRIPTION,
        COMMANDS_CONNECT,
        COMMANDS_ENTER,
        COMMANDS_EXPORT,
        COMMANDS_IMPORT,
        HOOKS_IMAGE,
        HOOKS_PRE_CREATE,
        HOOKS_POST_CREATE,
        HOOKS_POST_START,
        PORTS_EXPOSE,
        PORTS_WAIT,
    ])
});

/// Returns true when `key` belongs to the template namespace.
#[must_use]
pub fn in_namespace(key: &str) -> bool {
    key.starts_with(NAMESPACE)
}

/// Suffix of an exported-variable key, if `key` is one.
#[must_use]
pub fn exported_variable(key: &str) -> Option<&str> {
    wildcard_suffix(key, VARIABLES_EXPORTED)
}

/// Suffix of a mapped-variable key, if `key` is one.
#[must_use]
pub fn mapped_variable(key: &str) -> Option<&str> {
    wildcard_suffix(key, VARIABLES_MAPPED)
}

fn wildcard_suffix<'a>(key: &'a str, family: &str) -> Option<&'a str> {
    key.strip_prefix(family)?
        .strip_prefix('.')
        .filter(|suffix| !suffix.is_empty())
}

/// Whether a namespaced key is an exact recognized key or in a wildcard family.
#[must_use]
pub fn is_valid(key: &str) -> bool {
    VALID_KEYS.contains(key) || exported_variable(key).is_some() || mapped_variable(key).is_some()
}
