//! Binding handler references to functions
//!
//! A [`DecodeTable`] only knows handler names. A [`Dispatcher`] resolves every
//! name once, up front, so that dispatching a word costs one table probe per group
//! and one indirect call.
use std::collections::HashMap;

use crate::{
    config::DecodeConfig,
    error::BuildError,
    rule::{HandlerRef, Rule},
    table::DecodeTable,
};

/// Turns a matched word into a `T`
///
/// Receives the raw word, the rule it matched and the decode configuration. May
/// still return `None`, for example when an operand field holds a reserved value.
pub type HandlerFn<T> = fn(word: u32, rule: &Rule, config: &DecodeConfig) -> Option<T>;

/// Registry of handler functions by name
pub struct HandlerSet<T> {
    handlers: HashMap<HandlerRef, HandlerFn<T>>,
}

impl<T> HandlerSet<T> {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Register `function` under `handler`, returning the one it replaces
    pub fn register(
        &mut self,
        handler: impl Into<HandlerRef>,
        function: HandlerFn<T>,
    ) -> Option<HandlerFn<T>> {
        self.handlers.insert(handler.into(), function)
    }

    /// Builder-style [`HandlerSet::register`]
    pub fn with(mut self, handler: impl Into<HandlerRef>, function: HandlerFn<T>) -> Self {
        self.register(handler, function);
        self
    }

    pub fn get(&self, handler: &HandlerRef) -> Option<HandlerFn<T>> {
        self.handlers.get(handler).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for HandlerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A decode table with every rule bound to its handler function
pub struct Dispatcher<'t, T> {
    table: &'t DecodeTable,
    /// `bound[g][i]` handles rule `i` of group `g`
    bound: Vec<Vec<HandlerFn<T>>>,
    config: DecodeConfig,
}

impl<'t, T> Dispatcher<'t, T> {
    /// Resolve the handler of every rule in `table`
    ///
    /// # Returns
    /// * `Ok(Dispatcher)` - Ready to dispatch
    /// * `Err(BuildError::UnboundHandler)` - For the first rule whose handler is not
    ///   in `handlers`
    pub fn bind(
        table: &'t DecodeTable,
        handlers: &HandlerSet<T>,
        config: DecodeConfig,
    ) -> Result<Self, BuildError> {
        let bound = table
            .groups()
            .iter()
            .map(|group| {
                group
                    .rules()
                    .iter()
                    .map(|rule| {
                        handlers.get(rule.handler()).ok_or_else(|| BuildError::UnboundHandler {
                            handler: rule.handler().to_string(),
                            rule: rule.name().to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { table, bound, config })
    }

    pub const fn table(&self) -> &'t DecodeTable {
        self.table
    }

    pub const fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode `word` and hand it to its rule's handler
    ///
    /// Returns `None` when no rule matches, or when the matched rule's handler
    /// declines the word. A declined word is not offered to later groups.
    pub fn dispatch(&self, word: u32) -> Option<T> {
        for (group, bound) in self.table.groups().iter().zip(&self.bound) {
            if let Some(slot) = group.slot_of(word) {
                return bound[slot](word, &group.rules()[slot], &self.config);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{BuildConfig, InstructionLength},
        table::TableBuilder,
    };

    fn table() -> DecodeTable {
        let rules = vec![
            Rule::new("ADD", 0xfe00_707f, 0x0000_0033, "h_rtype").unwrap(),
            Rule::new("SUB", 0xfe00_707f, 0x4000_0033, "h_rtype").unwrap(),
            Rule::new("ADDI", 0x0000_707f, 0x0000_0013, "h_itype").unwrap().with_opcode("OP_ADDI"),
        ];
        TableBuilder::new(BuildConfig::new().with_seed(23)).build(rules).unwrap()
    }

    fn rtype(word: u32, rule: &Rule, _: &DecodeConfig) -> Option<String> {
        Some(format!("{} x{}", rule.opcode_name(), (word >> 7) & 0x1f))
    }

    fn itype(word: u32, rule: &Rule, config: &DecodeConfig) -> Option<String> {
        // Pretend x0 as destination is reserved
        let rd = (word >> 7) & 0x1f;
        (rd != 0).then(|| format!("{} x{rd} ({})", rule.opcode_name(), config.instruction_length))
    }

    #[test]
    fn test_dispatch_calls_bound_handler() {
        let table = table();
        let handlers = HandlerSet::new().with("h_rtype", rtype).with("h_itype", itype);
        let config = DecodeConfig::new(InstructionLength::Standard);
        let dispatcher = Dispatcher::bind(&table, &handlers, config).unwrap();

        assert_eq!(dispatcher.dispatch(0x0031_00b3).as_deref(), Some("ADD x1"));
        assert_eq!(dispatcher.dispatch(0x4073_02b3).as_deref(), Some("SUB x5"));
        assert_eq!(dispatcher.dispatch(0xfff0_0093).as_deref(), Some("OP_ADDI x1 (32-bit)"));
        assert_eq!(dispatcher.dispatch(0xffff_ffff), None);
    }

    #[test]
    fn test_declined_word_stops_dispatch() {
        let table = table();
        let handlers = HandlerSet::new().with("h_rtype", rtype).with("h_itype", itype);
        let dispatcher = Dispatcher::bind(&table, &handlers, DecodeConfig::default()).unwrap();
        // addi x0, x0, 0
        assert_eq!(dispatcher.dispatch(0x0000_0013), None);
    }

    #[test]
    fn test_bind_reports_missing_handler() {
        let table = table();
        let handlers = HandlerSet::new().with("h_rtype", rtype);
        let err = Dispatcher::bind(&table, &handlers, DecodeConfig::default()).err().unwrap();
        assert_eq!(
            err,
            BuildError::UnboundHandler { handler: "h_itype".to_string(), rule: "ADDI".to_string() }
        );
    }

    #[test]
    fn test_register_replaces() {
        let mut handlers: HandlerSet<String> = HandlerSet::new();
        assert!(handlers.register("h", rtype).is_none());
        assert!(handlers.register("h", itype).is_some());
        assert_eq!(handlers.len(), 1);
    }
}
