//! Identifier to CLI token conversion.
//!
//! Task types, operations and parameters are declared with identifier-style
//! names (`ReadFile`, `do_something`). On the command line they appear as
//! lowercase hyphenated tokens (`read-file`, `do-something`). Inbound tokens
//! are compared against transformed names as-is; there is no reverse mapping.

use heck::ToKebabCase;

/// Convert an identifier into its command-line token.
///
/// ```
/// use rym::naming::to_token;
///
/// assert_eq!(to_token("ReadFile"), "read-file");
/// assert_eq!(to_token("do_something"), "do-something");
/// assert_eq!(to_token("execute"), "execute");
/// ```
pub fn to_token(identifier: &str) -> String {
    identifier.to_kebab_case()
}
