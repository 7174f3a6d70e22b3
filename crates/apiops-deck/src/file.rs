//! decK `file` subcommands: local operations over declarative state files.

use crate::Deck;

/// `deck file ...` invocations.
#[derive(Debug)]
pub struct FileOps {
    /// The wrapped binary with its connection parameters.
    pub deck: Deck,
}

impl FileOps {
    /// Wrap a configured [`Deck`].
    pub fn new(deck: Deck) -> Self {
        Self { deck }
    }

    /// `deck file lint -s <state file> <ruleset>` — lint against a ruleset.
    pub fn lint(&mut self, state_file: &str, ruleset_file: &str) {
        self.deck
            .execute(&["file", "lint", "-s", state_file, ruleset_file]);
    }

    /// `deck file render <files...> -o <output>` — render state files.
    pub fn render(&mut self, state_files: &[&str], output_file: &str) {
        let mut command = vec!["file", "render"];
        command.extend(state_files);
        command.extend(["-o", output_file]);
        self.deck.execute(&command);
    }

    /// `deck file merge -o <output> <files...>` — merge state files.
    pub fn merge(&mut self, state_files: &[&str], output_file: &str) {
        let mut command = vec!["file", "merge", "-o", output_file];
        command.extend(state_files);
        self.deck.execute(&command);
    }

    /// `deck file validate <state file>` — validate a state file offline.
    pub fn validate(&mut self, state_file: &str) {
        self.deck.execute(&["file", "validate", state_file]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeckParams;

    #[test]
    fn merge_orders_output_flag_before_inputs() {
        let deck = Deck::new("deck", DeckParams::default());
        assert_eq!(
            deck.command_args(&["file", "merge", "-o", "out.yaml", "a.yaml", "b.yaml"]),
            vec!["file", "merge", "-o", "out.yaml", "a.yaml", "b.yaml"]
        );
    }

    #[test]
    fn failed_invocations_surface_in_the_error_list() {
        let mut ops = FileOps::new(Deck::new("/nonexistent/deck", DeckParams::default()));
        ops.lint("state.yaml", "ruleset.yaml");
        ops.render(&["a.yaml"], "out.yaml");
        ops.validate("state.yaml");
        assert_eq!(ops.deck.error.len(), 3);
    }
}
