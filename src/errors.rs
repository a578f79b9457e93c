/*!
 * Error types for the prismdocs tooling.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while validating or loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required string setting was left empty
    #[error("Configuration value '{0}' must not be empty")]
    Empty(&'static str),

    /// A setting holds a value the tooling cannot use
    #[error("Invalid value for '{key}': {reason}")]
    Invalid {
        /// Configuration key
        key: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Authoring errors reported for a single directive invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// No directive is registered under this name
    #[error("Unknown directive type \"{0}\"")]
    Unknown(String),

    /// Too few arguments were supplied
    #[error("Error in \"{name}\" directive: {required} argument(s) required, {supplied} supplied")]
    MissingArguments {
        /// Directive name
        name: String,
        /// Number of required arguments
        required: usize,
        /// Number of arguments found
        supplied: usize,
    },

    /// Too many arguments were supplied
    #[error("Error in \"{name}\" directive: maximum {allowed} argument(s) allowed, {supplied} supplied")]
    TooManyArguments {
        /// Directive name
        name: String,
        /// Maximum number of arguments
        allowed: usize,
        /// Number of arguments found
        supplied: usize,
    },

    /// The directive takes no body but one was given
    #[error("Error in \"{0}\" directive: no content permitted")]
    ContentNotPermitted(String),

    /// An option line names an option the directive does not accept
    #[error("Error in \"{name}\" directive: unknown option: \"{option}\"")]
    UnknownOption {
        /// Directive name
        name: String,
        /// Option as written in the source
        option: String,
    },
}

/// Errors raised while turning markup source into a document tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// A directive failed at the given source line
    #[error("line {line}: {source}")]
    Directive {
        /// 1-based source line of the directive marker
        line: usize,
        /// Underlying directive error
        #[source]
        source: DirectiveError,
    },

    /// A section title was malformed
    #[error("line {line}: {message}")]
    Structure {
        /// 1-based source line
        line: usize,
        /// Problem description
        message: String,
    },
}
