use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all droidplan operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DroidplanError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed project descriptor (e.g. Droidplan.toml).
    #[error("Descriptor error: {message}")]
    #[diagnostic(help("Check your Droidplan.toml for syntax errors"))]
    Descriptor { message: String },

    /// The version catalog could not be read or is inconsistent.
    #[error("Version catalog error: {message}")]
    Catalog { message: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// No catalog version satisfies the requirements on a component, or two
    /// requirements on it contradict each other.
    #[error("Cannot resolve `{component}`: {reason}")]
    #[diagnostic(code(droidplan::unresolvable_version))]
    UnresolvableVersion {
        component: String,
        reason: String,
        /// Every requirement involved, rendered as `origin: expression`.
        requirements: Vec<String>,
    },

    /// A dependency has no explicit version and no imported platform pins it.
    #[error("Dependency `{coordinate}` has no version and no imported platform manages it")]
    #[diagnostic(
        code(droidplan::unmanaged_dependency),
        help("Add an explicit version or import a platform (BOM) that pins it")
    )]
    UnmanagedDependency { coordinate: String },

    /// Variant parent links contain a cycle.
    #[error("Variant parent links form a cycle: {}", render_cycle(.cycle))]
    #[diagnostic(code(droidplan::invalid_variant_graph))]
    InvalidVariantGraph { cycle: Vec<String> },

    /// A variant names a parent that was never declared.
    #[error("Variant `{variant}` declares unknown parent `{parent}`")]
    #[diagnostic(code(droidplan::unknown_variant))]
    UnknownVariant { variant: String, parent: String },

    /// No variant on the ancestor chain defines the attribute.
    #[error("Variant `{variant}` has no value for attribute `{key}`")]
    #[diagnostic(
        code(droidplan::missing_attribute),
        help("Define it on the variant, on one of its parents, or under [attributes.defaults]")
    )]
    MissingAttribute { variant: String, key: String },

    /// Plugin `depends-on` edges contain a cycle.
    #[error("Plugin dependencies form a cycle: {}", render_cycle(.cycle))]
    #[diagnostic(code(droidplan::plugin_cycle))]
    PluginCycle { cycle: Vec<String> },

    /// A plugin depends on an id that is not declared in the project.
    #[error("Plugin `{plugin}` depends on undeclared plugin `{dependency}`")]
    #[diagnostic(code(droidplan::unknown_plugin_dependency))]
    UnknownPluginDependency { plugin: String, dependency: String },

    /// A platform (BOM) import could not be located by any fetcher.
    #[error("Platform `{coordinate}` could not be found")]
    #[diagnostic(
        code(droidplan::platform_not_found),
        help("Check the coordinate and the configured [repositories]")
    )]
    PlatformNotFound { coordinate: String },

    /// One or more variants failed; the others resolved successfully.
    #[error(
        "{} of {} variants failed to resolve",
        .failures.len(),
        .failures.len() + .succeeded.len()
    )]
    #[diagnostic(code(droidplan::aggregate))]
    AggregateResolution {
        #[related]
        failures: Vec<VariantFailure>,
        succeeded: Vec<String>,
    },

    /// A bounded step did not finish in time.
    #[error("{what} timed out after {seconds}s")]
    Timeout { what: String, seconds: u64 },

    /// The run was cancelled before it completed.
    #[error("Resolution cancelled")]
    Cancelled,

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// The failure of a single variant inside an aggregate result.
#[derive(Debug, Error, Diagnostic)]
#[error("variant `{variant}`: {error}")]
pub struct VariantFailure {
    pub variant: String,
    pub error: Box<DroidplanError>,
}

fn render_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => format!("{} -> {first}", cycle.join(" -> ")),
        None => String::new(),
    }
}

/// Typed result used by the resolution engine so callers can match on kinds.
pub type ResolveResult<T> = Result<T, DroidplanError>;
