use crate::{Gateway, GatewayError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Shared view of the prompts a scripted gateway has received.
pub type PromptLog = Rc<RefCell<Vec<String>>>;

/// Replays canned answers in order and records every prompt it is given.
pub struct ScriptedGateway {
    name: String,
    responses: VecDeque<Result<String, GatewayError>>,
    prompts: PromptLog,
}

impl ScriptedGateway {
    pub fn new<I>(name: impl Into<String>, responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GatewayError>>,
    {
        ScriptedGateway {
            name: name.into(),
            responses: responses.into_iter().collect(),
            prompts: PromptLog::default(),
        }
    }

    /// A gateway that answers each text in turn.
    pub fn from_moves<I, S>(name: impl Into<String>, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, moves.into_iter().map(|m| Ok(m.into())))
    }

    /// Handle to the prompt log; stays valid after the gateway is moved.
    pub fn prompts(&self) -> PromptLog {
        Rc::clone(&self.prompts)
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Gateway for ScriptedGateway {
    fn generate(&mut self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.responses.pop_front().unwrap_or(Err(GatewayError::Exhausted))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order_then_exhausts() {
        let mut gateway = ScriptedGateway::new(
            "script",
            [Ok("e4".to_string()), Err(GatewayError::EmptyCompletion)],
        );
        let log = gateway.prompts();

        assert_eq!(gateway.generate("first"), Ok("e4".to_string()));
        assert_eq!(gateway.generate("second"), Err(GatewayError::EmptyCompletion));
        assert_eq!(gateway.generate("third"), Err(GatewayError::Exhausted));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(gateway.remaining(), 0);
    }

    #[test]
    fn test_from_moves() {
        let mut gateway = ScriptedGateway::from_moves("w", ["e4", "Nf3"]);
        assert_eq!(gateway.name(), "w");
        assert_eq!(gateway.remaining(), 2);
        assert_eq!(gateway.generate("p"), Ok("e4".to_string()));
    }
}
