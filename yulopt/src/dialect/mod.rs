//! EVM dialect: builtin functions, their side effects, and machine constants

use std::collections::HashMap;

use num_bigint::BigInt;
use num_traits::One;

/// Size of a machine word in bytes
pub const WORD_SIZE: u64 = 32;

/// Number of bits in a machine word
pub const WORD_BITS: u32 = 256;

/// `2^256`, the modulus of machine-word arithmetic
pub fn word_modulus() -> BigInt {
    BigInt::one() << WORD_BITS
}

/// Upper bound assumed for "environment size" builtins (calldatasize,
/// codesize, extcodesize, msize, returndatasize): `2^32`, the EIP-1985
/// limits.
///
/// This is a policy constant, not a derived fact: proofs built on it are
/// only valid on targets where such sizes never exceed it.
pub fn max_environment_data_size() -> BigInt {
    BigInt::one() << 32
}

/// EVM instruction backing a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Keccak256,
    Address,
    Caller,
    CallValue,
    CalldataLoad,
    CalldataSize,
    CalldataCopy,
    CodeSize,
    CodeCopy,
    Gas,
    ExtCodeSize,
    ExtCodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    Mload,
    Mstore,
    Mstore8,
    Msize,
    Sload,
    Sstore,
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Return,
    Revert,
    Stop,
    Log0,
    Log1,
}

/// How an instruction interacts with one kind of state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Effect {
    None,
    Read,
    Write,
}

/// Per-instruction (or per-function) effect summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffects {
    pub memory: Effect,
    pub storage: Effect,
    pub other_state: Effect,
}

impl SideEffects {
    pub fn none() -> Self {
        SideEffects {
            memory: Effect::None,
            storage: Effect::None,
            other_state: Effect::None,
        }
    }

    /// The summary assumed for anything unknown
    pub fn worst() -> Self {
        SideEffects {
            memory: Effect::Write,
            storage: Effect::Write,
            other_state: Effect::Write,
        }
    }

    pub fn join(self, other: SideEffects) -> SideEffects {
        SideEffects {
            memory: self.memory.max(other.memory),
            storage: self.storage.max(other.storage),
            other_state: self.other_state.max(other.other_state),
        }
    }

    /// Whether executing this can change memory contents
    pub fn invalidates_memory(&self) -> bool {
        self.memory == Effect::Write
    }

    pub fn invalidates_storage(&self) -> bool {
        self.storage == Effect::Write
    }
}

/// A builtin function of the dialect
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub instruction: Option<Instruction>,
    pub parameters: usize,
    pub returns: usize,
    pub side_effects: SideEffects,
}

/// The EVM dialect: name-indexed builtin table
#[derive(Debug)]
pub struct EvmDialect {
    builtins: HashMap<&'static str, Builtin>,
}

impl EvmDialect {
    pub fn new() -> Self {
        use Effect::{Read, Write};
        use Instruction::*;

        let mut builtins = HashMap::new();
        let mut builtin = |name: &'static str,
                           instruction: Instruction,
                           parameters: usize,
                           returns: usize,
                           memory: Effect,
                           storage: Effect,
                           other_state: Effect| {
            builtins.insert(
                name,
                Builtin {
                    name,
                    instruction: Some(instruction),
                    parameters,
                    returns,
                    side_effects: SideEffects {
                        memory,
                        storage,
                        other_state,
                    },
                },
            );
        };

        let none = Effect::None;

        // Arithmetic and comparison
        builtin("add", Add, 2, 1, none, none, none);
        builtin("sub", Sub, 2, 1, none, none, none);
        builtin("mul", Mul, 2, 1, none, none, none);
        builtin("div", Div, 2, 1, none, none, none);
        builtin("mod", Mod, 2, 1, none, none, none);
        builtin("lt", Lt, 2, 1, none, none, none);
        builtin("gt", Gt, 2, 1, none, none, none);
        builtin("eq", Eq, 2, 1, none, none, none);
        builtin("iszero", IsZero, 1, 1, none, none, none);
        builtin("and", And, 2, 1, none, none, none);
        builtin("or", Or, 2, 1, none, none, none);
        builtin("xor", Xor, 2, 1, none, none, none);
        builtin("not", Not, 1, 1, none, none, none);
        builtin("shl", Shl, 2, 1, none, none, none);
        builtin("shr", Shr, 2, 1, none, none, none);

        // Environment
        builtin("keccak256", Keccak256, 2, 1, Read, none, none);
        builtin("address", Address, 0, 1, none, none, Read);
        builtin("caller", Caller, 0, 1, none, none, Read);
        builtin("callvalue", CallValue, 0, 1, none, none, Read);
        builtin("calldataload", CalldataLoad, 1, 1, none, none, Read);
        builtin("calldatasize", CalldataSize, 0, 1, none, none, Read);
        builtin("calldatacopy", CalldataCopy, 3, 0, Write, none, Read);
        builtin("codesize", CodeSize, 0, 1, none, none, Read);
        builtin("codecopy", CodeCopy, 3, 0, Write, none, Read);
        builtin("gas", Gas, 0, 1, none, none, Read);
        builtin("extcodesize", ExtCodeSize, 1, 1, none, none, Read);
        builtin("extcodecopy", ExtCodeCopy, 4, 0, Write, none, Read);
        builtin("returndatasize", ReturnDataSize, 0, 1, none, none, Read);
        builtin("returndatacopy", ReturnDataCopy, 3, 0, Write, none, Read);

        // Memory and storage
        builtin("mload", Mload, 1, 1, Read, none, none);
        builtin("mstore", Mstore, 2, 0, Write, none, none);
        builtin("mstore8", Mstore8, 2, 0, Write, none, none);
        builtin("msize", Msize, 0, 1, Read, none, none);
        builtin("sload", Sload, 1, 1, none, Read, none);
        builtin("sstore", Sstore, 2, 0, none, Write, none);

        // Calls and control
        builtin("call", Call, 7, 1, Write, Write, Write);
        builtin("callcode", CallCode, 7, 1, Write, Write, Write);
        builtin("delegatecall", DelegateCall, 6, 1, Write, Write, Write);
        builtin("staticcall", StaticCall, 6, 1, Write, Read, Read);
        builtin("create", Create, 3, 1, Read, Write, Write);
        builtin("return", Return, 2, 0, Read, none, none);
        builtin("revert", Revert, 2, 0, Read, none, none);
        builtin("stop", Stop, 0, 0, none, none, none);
        builtin("log0", Log0, 2, 0, Read, none, Write);
        builtin("log1", Log1, 3, 0, Read, none, Write);

        EvmDialect { builtins }
    }

    pub fn builtin(&self, name: &str) -> Option<&Builtin> {
        self.builtins.get(name)
    }

    /// Name of the single-word memory store builtin
    pub fn memory_store_function(&self) -> &'static str {
        "mstore"
    }

    /// Name of the single-word memory load builtin
    pub fn memory_load_function(&self) -> &'static str {
        "mload"
    }
}

impl Default for EvmDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let dialect = EvmDialect::new();
        assert_eq!(dialect.builtin("mstore").unwrap().parameters, 2);
        assert!(dialect.builtin("frobnicate").is_none());
    }

    #[test]
    fn test_memory_effects() {
        let dialect = EvmDialect::new();
        assert!(dialect.builtin("mstore").unwrap().side_effects.invalidates_memory());
        assert!(dialect.builtin("calldatacopy").unwrap().side_effects.invalidates_memory());
        assert!(dialect.builtin("staticcall").unwrap().side_effects.invalidates_memory());
        assert!(!dialect.builtin("sstore").unwrap().side_effects.invalidates_memory());
        assert!(!dialect.builtin("mload").unwrap().side_effects.invalidates_memory());
        assert!(!dialect.builtin("keccak256").unwrap().side_effects.invalidates_memory());
    }

    #[test]
    fn test_effect_join() {
        let a = SideEffects {
            memory: Effect::Read,
            storage: Effect::None,
            other_state: Effect::None,
        };
        let b = SideEffects {
            memory: Effect::Write,
            storage: Effect::Read,
            other_state: Effect::None,
        };
        let joined = a.join(b);
        assert_eq!(joined.memory, Effect::Write);
        assert_eq!(joined.storage, Effect::Read);
    }

    #[test]
    fn test_word_constants() {
        assert_eq!(word_modulus(), BigInt::one() << 256);
        assert_eq!(max_environment_data_size(), BigInt::from(1u64 << 32));
    }
}
