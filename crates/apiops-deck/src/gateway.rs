//! decK `gateway` subcommands: operations against a live control plane.

use crate::Deck;

/// `deck gateway ...` invocations.
#[derive(Debug)]
pub struct GatewayOps {
    /// The wrapped binary with its connection parameters.
    pub deck: Deck,
}

impl GatewayOps {
    /// Wrap a configured [`Deck`].
    pub fn new(deck: Deck) -> Self {
        Self { deck }
    }

    /// `deck gateway sync <state file>` — apply a state file to the cluster.
    pub fn sync(&mut self, state_file: &str) {
        self.deck.execute(&["gateway", "sync", state_file]);
    }

    /// `deck gateway diff <state file>` — show what a sync would change.
    pub fn diff(&mut self, state_file: &str) {
        self.deck.execute(&["gateway", "diff", state_file]);
    }

    /// `deck gateway dump` — export the cluster's current state.
    pub fn dump(&mut self) {
        self.deck.execute(&["gateway", "dump"]);
    }

    /// `deck gateway validate <state file>` — validate against the cluster.
    pub fn validate(&mut self, state_file: &str) {
        self.deck.execute(&["gateway", "validate", state_file]);
    }
}
