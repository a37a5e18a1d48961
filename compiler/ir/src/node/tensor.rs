// Copyright (C) 2022-2026 The Rill Contributors.
// This file is part of the Rill library.

// The Rill library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The Rill library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the Rill library. If not, see <https://www.gnu.org/licenses/>.

//! Helpers for the textual tensor references used in node input lists.
//!
//! A data input is written `producer:port`, where `:0` may be omitted. A
//! control input is written `^producer` and carries no port.

/// The marker prefix of a control input.
pub const CONTROL_PREFIX: char = '^';

/// Returns `true` if the input reference denotes a control edge.
pub fn is_control_input(input: &str) -> bool {
    input.starts_with(CONTROL_PREFIX)
}

/// Extracts the producer node name from an input reference, stripping the
/// control marker and the output port, if any.
pub fn node_name(input: &str) -> &str {
    let name = input.strip_prefix(CONTROL_PREFIX).unwrap_or(input);
    match name.find(':') {
        Some(colon) => &name[..colon],
        None => name,
    }
}

/// Extracts the output port from an input reference. A missing port reads as
/// port 0.
pub fn output_port(input: &str) -> usize {
    match input.find(':') {
        Some(colon) => input[colon + 1..].parse().unwrap_or(0),
        None => 0,
    }
}

/// Formats a control dependency on the given node.
pub fn as_control_dependency(name: &str) -> String {
    format!("{CONTROL_PREFIX}{}", node_name(name))
}

/// Formats a reference to the `port`-th output of `name`.
pub fn tensor_ref(name: &str, port: usize) -> String {
    format!("{name}:{port}")
}

/// Prepends `prefix/` to the producer-name part of an input reference,
/// preserving a leading control marker and a trailing output port.
pub fn add_prefix_to_node_name(input: &str, prefix: &str) -> String {
    match input.strip_prefix(CONTROL_PREFIX) {
        Some(rest) => format!("{CONTROL_PREFIX}{prefix}/{rest}"),
        None => format!("{prefix}/{input}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name() {
        assert_eq!(node_name("a"), "a");
        assert_eq!(node_name("a:2"), "a");
        assert_eq!(node_name("^a"), "a");
        assert_eq!(node_name("scope/a:0"), "scope/a");
    }

    #[test]
    fn test_output_port() {
        assert_eq!(output_port("a"), 0);
        assert_eq!(output_port("a:0"), 0);
        assert_eq!(output_port("a:3"), 3);
    }

    #[test]
    fn test_control_inputs() {
        assert!(is_control_input("^a"));
        assert!(!is_control_input("a"));
        assert_eq!(as_control_dependency("a:1"), "^a");
        assert_eq!(as_control_dependency("^a"), "^a");
    }

    #[test]
    fn test_add_prefix() {
        assert_eq!(add_prefix_to_node_name("x", "f"), "f/x");
        assert_eq!(add_prefix_to_node_name("x:1", "f"), "f/x:1");
        assert_eq!(add_prefix_to_node_name("^x", "f"), "^f/x");
    }
}
