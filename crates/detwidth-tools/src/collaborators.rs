//! Command builders for the external collaborators.
//!
//! Each function returns the exact [`Invocation`] the pipeline stage issues.
//! Argument order and the literal flag sequences are fixed by the
//! collaborators' command lines.

use std::fmt;
use std::path::{Path, PathBuf};

use detwidth_core::Header;

use crate::traits::Invocation;

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Regex to minimum DFA.
    Compile,
    /// DFA minimization.
    Minimize,
    /// Pruning of the minimum DFA.
    Prune,
    /// Infimum string automaton.
    Infima,
    /// Supremum string automaton.
    Suprema,
    /// Interval merge.
    Merge,
    /// Decision procedure query.
    Oracle,
}

impl Stage {
    /// Short name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Minimize => "minimize",
            Self::Prune => "prune",
            Self::Infima => "infima",
            Self::Suprema => "suprema",
            Self::Merge => "merge",
            Self::Oracle => "oracle",
        }
    }

    /// Human description printed in verbose mode.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Compile => "computing the minimum DFA of the regexp",
            Self::Minimize => "computing minimum DFA",
            Self::Prune => "pruning minimum DFA",
            Self::Infima => "compute infima strings DFA",
            Self::Suprema => "compute suprema strings DFA",
            Self::Merge => "merging infimum and supremum pruned DFAs",
            Self::Oracle => "compute A^p pruned automaton and check language width",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved collaborator executables for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    /// Regex compiler.
    pub compiler: PathBuf,
    /// DFA minimizer.
    pub minimizer: PathBuf,
    /// Pruner.
    pub pruner: PathBuf,
    /// Partition refiner.
    pub partition_refiner: PathBuf,
    /// Merger.
    pub merger: PathBuf,
    /// Decision procedure (already chosen between default and low-memory).
    pub oracle: PathBuf,
}

/// Partition refinement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefinementMode {
    /// Lexicographically smallest strings reaching each state.
    Infimum,
    /// Lexicographically largest strings reaching each state.
    Supremum,
}

impl RefinementMode {
    /// The refiner's mode selector: `0 1 <bit> 1 0 1`.
    pub const fn flags(self) -> [&'static str; 6] {
        match self {
            Self::Infimum => ["0", "1", "0", "1", "0", "1"],
            Self::Supremum => ["0", "1", "1", "1", "0", "1"],
        }
    }

    const fn stage(self) -> Stage {
        match self {
            Self::Infimum => Stage::Infima,
            Self::Supremum => Stage::Suprema,
        }
    }
}

/// Prefix the regex with the end marker the compiler expects: `($)(expr)`.
pub fn wrap_regex(expr: &str) -> String {
    format!("($)({expr})")
}

/// `compiler <wrapped-regex> --DFAmin > output`
pub fn compile_regex(tools: &ToolPaths, expr: &str, output: &Path) -> Invocation {
    Invocation::new(Stage::Compile, &tools.compiler)
        .arg(wrap_regex(expr))
        .arg("--DFAmin")
        .stdout_to(output)
}

/// `minimizer < input > output`
pub fn minimize(tools: &ToolPaths, input: &Path, output: &Path) -> Invocation {
    Invocation::new(Stage::Minimize, &tools.minimizer)
        .stdin_from(input)
        .stdout_to(output)
}

/// `pruner <input> <outputMin> <outputMax>`
pub fn prune(tools: &ToolPaths, input: &Path, output_min: &Path, output_max: &Path) -> Invocation {
    Invocation::new(Stage::Prune, &tools.pruner)
        .path_arg(input)
        .path_arg(output_min)
        .path_arg(output_max)
}

/// `partref <input> <output> <stateCount> <sourceState> 0 1 <bit> 1 0 1`
pub fn refine(
    tools: &ToolPaths,
    mode: RefinementMode,
    input: &Path,
    output: &Path,
    header: Header,
) -> Invocation {
    Invocation::new(mode.stage(), &tools.partition_refiner)
        .path_arg(input)
        .path_arg(output)
        .arg(header.state_count.to_string())
        .arg(header.source_state.to_string())
        .args(mode.flags())
}

/// `merger <infimum> <supremum> <output> <stateCount> <sourceState> 0 1`
pub fn merge(
    tools: &ToolPaths,
    infima: &Path,
    suprema: &Path,
    output: &Path,
    header: Header,
) -> Invocation {
    Invocation::new(Stage::Merge, &tools.merger)
        .path_arg(infima)
        .path_arg(suprema)
        .path_arg(output)
        .arg(header.state_count.to_string())
        .arg(header.source_state.to_string())
        .args(["0", "1"])
}

/// `oracle <p> <automaton> <interval>` run inside `working_directory`.
pub fn decide(
    oracle: &Path,
    p: usize,
    automaton: &Path,
    interval: &Path,
    working_directory: &Path,
) -> Invocation {
    Invocation::new(Stage::Oracle, oracle)
        .arg(p.to_string())
        .path_arg(automaton)
        .path_arg(interval)
        .current_dir(working_directory)
}
