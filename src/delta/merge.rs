// Command merging.
//
// One left-to-right pass folds each command into the running one whenever
// the two are mergeable (see `Command::can_merge`). The output never holds
// two adjacent mergeable commands.

use super::command::Command;

/// Collapse adjacent mergeable commands.
pub fn merge_commands(commands: Vec<Command>) -> Vec<Command> {
    let mut merged: Vec<Command> = Vec::with_capacity(commands.len());
    let mut iter = commands.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        if current.can_merge(&next) {
            current.absorb(next);
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }
    merged.push(current);
    merged
}
