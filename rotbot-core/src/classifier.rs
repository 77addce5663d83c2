//! State classifier
//!
//! Resolves a [`QuantizedTriple`] to exactly one [`SystemState`].
//!
//! ## Algorithm
//!
//! Rule-sets are evaluated in fixed priority order: Green, then Yellow, then
//! Red. Each rule is an exact-match triple. The first rule-set containing the
//! input wins and evaluation stops there, so a triple listed under both Green
//! and Red resolves Green. A triple listed nowhere resolves to the configured
//! default state.
//!
//! There is no memory between cycles: no hysteresis, no dwell time, no
//! transition guards. The same triple always yields the same state.
//!
//! ```
//! use rotbot_core::{ClassifierConfig, QuantizedTriple, StateClassifier, SystemState};
//!
//! let classifier = StateClassifier::new(ClassifierConfig::reference())?;
//!
//! // Not in any reference rule-set: falls back to the default
//! let result = classifier.classify(&QuantizedTriple::at_most(30.0, 28.0, 1300.0));
//! assert_eq!(result.state, SystemState::Yellow);
//! assert!(!result.matched);
//! # Ok::<(), rotbot_core::ConfigError>(())
//! ```

use heapless::Vec;

use crate::config::ClassifierConfig;
use crate::constants::MAX_RULES_PER_STATE;
use crate::errors::{ConfigError, ConfigResult};
use crate::quantizer::{QuantizedTriple, Quantizer};
use crate::reading::SensorReading;
use crate::state::SystemState;

type RuleSet = Vec<QuantizedTriple, MAX_RULES_PER_STATE>;

/// Per-state rule-sets, evaluated in priority order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    sets: [RuleSet; 3],
}

impl RuleTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from one slice per state
    pub fn from_sets(
        green: &[QuantizedTriple],
        yellow: &[QuantizedTriple],
        red: &[QuantizedTriple],
    ) -> ConfigResult<Self> {
        let mut table = Self::new();
        for (state, rules) in SystemState::ALL.into_iter().zip([green, yellow, red]) {
            for rule in rules {
                table.insert(state, *rule)?;
            }
        }
        Ok(table)
    }

    /// Add a rule to `state`'s rule-set
    ///
    /// Duplicates within one rule-set are ignored.
    pub fn insert(&mut self, state: SystemState, triple: QuantizedTriple) -> ConfigResult<()> {
        let set = &mut self.sets[state.index()];
        if set.contains(&triple) {
            return Ok(());
        }
        set.push(triple).map_err(|_| ConfigError::CapacityExceeded {
            what: "rule-set",
            limit: MAX_RULES_PER_STATE,
        })
    }

    /// Rules that map to `state`
    pub fn rules_for(&self, state: SystemState) -> &[QuantizedTriple] {
        &self.sets[state.index()]
    }

    /// Total number of rules across all states
    pub fn len(&self) -> usize {
        self.sets.iter().map(|set| set.len()).sum()
    }

    /// True when no state has any rule
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First state in priority order whose rule-set contains `triple`
    pub fn lookup(&self, triple: &QuantizedTriple) -> Option<SystemState> {
        SystemState::ALL
            .into_iter()
            .find(|state| self.rules_for(*state).contains(triple))
    }

    /// Triples listed under more than one state
    ///
    /// Yields `(triple, winning state, shadowed state)`.
    pub fn overlaps(&self) -> impl Iterator<Item = (QuantizedTriple, SystemState, SystemState)> + '_ {
        SystemState::ALL.into_iter().enumerate().flat_map(move |(position, winner)| {
            self.rules_for(winner).iter().flat_map(move |triple| {
                SystemState::ALL
                    .into_iter()
                    .skip(position + 1)
                    .filter(move |loser| self.rules_for(*loser).contains(triple))
                    .map(move |loser| (*triple, winner, loser))
            })
        })
    }
}

/// Outcome of classifying one triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Triple that was classified
    pub triple: QuantizedTriple,
    /// Resolved state
    pub state: SystemState,
    /// False when the default state was used
    pub matched: bool,
}

/// Quantizer plus rule table plus fallback policy
#[derive(Debug, Clone)]
pub struct StateClassifier {
    quantizer: Quantizer,
    rules: RuleTable,
    default_state: SystemState,
}

impl StateClassifier {
    /// Validate a configuration and build the classifier
    ///
    /// Every rule category must be producible by the quantizer, otherwise the
    /// rule could never match. Overlapping rule-sets are accepted and logged;
    /// priority order resolves them.
    pub fn new(config: ClassifierConfig) -> ConfigResult<Self> {
        let quantizer = Quantizer::new(&config.temperature, &config.humidity, &config.light)?;
        let rules = RuleTable::from_sets(&config.green, &config.yellow, &config.red)?;

        for state in SystemState::ALL {
            for triple in rules.rules_for(state) {
                quantizer.check_triple(triple)?;
            }
        }

        for (triple, winner, loser) in rules.overlaps() {
            log_warn!("Rule {} listed for {} and {}; {} wins", triple, winner, loser, winner);
        }

        Ok(Self {
            quantizer,
            rules,
            default_state: config.default_state,
        })
    }

    /// Classifier over explicit parts, skipping category checks
    pub fn from_parts(quantizer: Quantizer, rules: RuleTable, default_state: SystemState) -> Self {
        Self { quantizer, rules, default_state }
    }

    /// Quantizer in use
    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Rule table in use
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// State used when no rule matches
    pub fn default_state(&self) -> SystemState {
        self.default_state
    }

    /// Resolve a triple
    pub fn classify(&self, triple: &QuantizedTriple) -> Classification {
        match self.rules.lookup(triple) {
            Some(state) => Classification { triple: *triple, state, matched: true },
            None => Classification {
                triple: *triple,
                state: self.default_state,
                matched: false,
            },
        }
    }

    /// Quantize and resolve a raw reading
    pub fn classify_reading(&self, reading: &SensorReading) -> Classification {
        let triple = self.quantizer.quantize(reading);
        log_debug!("Quantized {:?} to {}", reading, triple);
        self.classify(&triple)
    }
}
