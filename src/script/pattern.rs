//! Standard script template recognition
//!
//! Predicates classify an ordered operation sequence into one of the
//! canonical payment templates. Builders are their inverse and return an
//! empty sequence when the semantic input cannot form a standard script.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_MULTISIG_KEYS, MAX_NULL_DATA_SIZE, SHORT_HASH_SIZE};
use crate::script::opcode::Opcode;
use crate::script::operation::Operation;
use crate::script::script::{ParseMode, Script};
use crate::types::{ByteString, ShortHash};

/// Standard script templates, in classification precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptPattern {
    /// [RETURN <data>]
    NullData,
    /// [OP_m <key>... OP_n CHECKMULTISIG]
    PayMultisig,
    /// [<key> CHECKSIG]
    PayPublicKey,
    /// [DUP HASH160 <hash> EQUALVERIFY CHECKSIG]
    PayKeyHash,
    /// [HASH160 <hash> EQUAL]
    PayScriptHash,
    /// [ZERO <sig>...]
    SignMultisig,
    /// [<sig>]
    SignPublicKey,
    /// [<sig> <key>]
    SignKeyHash,
    /// [<sig>... <redeem script>]
    SignScriptHash,
    NonStandard,
}

impl ScriptPattern {
    /// Templates that lock an output
    pub fn is_output(self) -> bool {
        matches!(
            self,
            ScriptPattern::NullData
                | ScriptPattern::PayMultisig
                | ScriptPattern::PayPublicKey
                | ScriptPattern::PayKeyHash
                | ScriptPattern::PayScriptHash
        )
    }

    /// Templates that unlock an input
    pub fn is_input(self) -> bool {
        matches!(
            self,
            ScriptPattern::SignMultisig
                | ScriptPattern::SignPublicKey
                | ScriptPattern::SignKeyHash
                | ScriptPattern::SignScriptHash
        )
    }
}

/// Shape check only: 33 bytes with an even/odd prefix or 65 bytes
/// uncompressed. Curve membership is not verified.
pub fn is_public_key(data: &[u8]) -> bool {
    match data.first() {
        Some(0x02) | Some(0x03) => data.len() == 33,
        Some(0x04) => data.len() == 65,
        _ => false,
    }
}

/// Operations that push their payload verbatim
fn is_data_push(op: &Operation) -> bool {
    op.code == Opcode::Zero || op.code.must_read_data()
}

fn is_short_hash_push(op: &Operation) -> bool {
    op.code == Opcode::Special && op.data.len() == SHORT_HASH_SIZE
}

pub fn is_push_only(ops: &[Operation]) -> bool {
    ops.iter().all(|op| op.code.is_push())
}

/// [RETURN <data>] with at most 80 payload bytes
pub fn is_null_data_pattern(ops: &[Operation]) -> bool {
    match ops {
        [ret, data] => {
            ret.code == Opcode::Return
                && is_data_push(data)
                && data.data.len() <= MAX_NULL_DATA_SIZE
        }
        _ => false,
    }
}

/// [OP_m <key>×n OP_n CHECKMULTISIG] with 1 ≤ m ≤ n ≤ 16
pub fn is_pay_multisig_pattern(ops: &[Operation]) -> bool {
    match ops {
        [op_m, keys @ .., op_n, check] => {
            if check.code != Opcode::CheckMultisig {
                return false;
            }

            let (m, n) = match (op_m.code.small_number(), op_n.code.small_number()) {
                (Some(m), Some(n)) => (m, n),
                _ => return false,
            };

            // OP_n pushes n keys, i.e. op_n - op_1 + 1, matching the builder.
            m <= n
                && keys.len() == n as usize
                && keys
                    .iter()
                    .all(|key| is_data_push(key) && is_public_key(&key.data))
        }
        _ => false,
    }
}

pub fn is_pay_public_key_pattern(ops: &[Operation]) -> bool {
    match ops {
        [key, check] => {
            check.code == Opcode::CheckSig && is_data_push(key) && is_public_key(&key.data)
        }
        _ => false,
    }
}

pub fn is_pay_key_hash_pattern(ops: &[Operation]) -> bool {
    match ops {
        [dup, hash160, hash, equal_verify, check] => {
            dup.code == Opcode::Dup
                && hash160.code == Opcode::Hash160
                && is_short_hash_push(hash)
                && equal_verify.code == Opcode::EqualVerify
                && check.code == Opcode::CheckSig
        }
        _ => false,
    }
}

pub fn is_pay_script_hash_pattern(ops: &[Operation]) -> bool {
    match ops {
        [hash160, hash, equal] => {
            hash160.code == Opcode::Hash160
                && is_short_hash_push(hash)
                && equal.code == Opcode::Equal
        }
        _ => false,
    }
}

/// Leading zero push (the CHECKMULTISIG off-by-one) then signatures
pub fn is_sign_multisig_pattern(ops: &[Operation]) -> bool {
    ops.len() >= 2 && ops[0].code == Opcode::Zero && is_push_only(ops)
}

pub fn is_sign_public_key_pattern(ops: &[Operation]) -> bool {
    ops.len() == 1 && is_push_only(ops)
}

pub fn is_sign_key_hash_pattern(ops: &[Operation]) -> bool {
    ops.len() == 2 && is_push_only(ops) && is_public_key(&ops[1].data)
}

/// Push-only with a trailing redeem script that is itself an output template.
///
/// The redeem script is classified with [`output_pattern`] only, so nesting
/// is examined to depth 1.
pub fn is_sign_script_hash_pattern(ops: &[Operation]) -> bool {
    if ops.len() < 2 || !is_push_only(ops) {
        return false;
    }

    let redeem_data = match ops.last() {
        Some(last) if !last.data.is_empty() => &last.data,
        _ => return false,
    };

    let mut source = redeem_data.as_slice();
    let mut redeem_script = Script::default();
    if redeem_script
        .from_data_with(&mut source, false, ParseMode::Strict)
        .is_err()
    {
        return false;
    }

    redeem_script.output_pattern().is_output()
}

/// Classify against the output templates only.
pub fn output_pattern(ops: &[Operation]) -> ScriptPattern {
    if is_null_data_pattern(ops) {
        ScriptPattern::NullData
    } else if is_pay_multisig_pattern(ops) {
        ScriptPattern::PayMultisig
    } else if is_pay_public_key_pattern(ops) {
        ScriptPattern::PayPublicKey
    } else if is_pay_key_hash_pattern(ops) {
        ScriptPattern::PayKeyHash
    } else if is_pay_script_hash_pattern(ops) {
        ScriptPattern::PayScriptHash
    } else {
        ScriptPattern::NonStandard
    }
}

/// Classify against every template; the first match wins.
pub fn pattern(ops: &[Operation]) -> ScriptPattern {
    let output = output_pattern(ops);
    if output != ScriptPattern::NonStandard {
        return output;
    }

    if is_sign_multisig_pattern(ops) {
        ScriptPattern::SignMultisig
    } else if is_sign_public_key_pattern(ops) {
        ScriptPattern::SignPublicKey
    } else if is_sign_key_hash_pattern(ops) {
        ScriptPattern::SignKeyHash
    } else if is_sign_script_hash_pattern(ops) {
        ScriptPattern::SignScriptHash
    } else {
        ScriptPattern::NonStandard
    }
}

/// [RETURN <data>], empty when `data` exceeds 80 bytes
pub fn to_null_data_pattern(data: &[u8]) -> Vec<Operation> {
    if data.len() > MAX_NULL_DATA_SIZE {
        return Vec::new();
    }

    vec![Operation::new(Opcode::Return), Operation::push(data)]
}

/// [<key> CHECKSIG], empty when `point` is not key shaped
pub fn to_pay_public_key_pattern(point: &[u8]) -> Vec<Operation> {
    if !is_public_key(point) {
        return Vec::new();
    }

    vec![Operation::push(point), Operation::new(Opcode::CheckSig)]
}

/// [OP_m <key>... OP_n CHECKMULTISIG]
///
/// Empty when `signatures` is outside `[1, keys]`, when there are more than
/// 16 keys, or when any key is not key shaped.
pub fn to_pay_multisig_pattern(signatures: u8, points: &[ByteString]) -> Vec<Operation> {
    let key_count = points.len();
    if signatures < 1 || key_count > MAX_MULTISIG_KEYS || signatures as usize > key_count {
        return Vec::new();
    }

    let (op_m, op_n) = match (
        Opcode::from_small_number(signatures),
        Opcode::from_small_number(key_count as u8),
    ) {
        (Some(op_m), Some(op_n)) => (op_m, op_n),
        _ => return Vec::new(),
    };

    let mut ops = Vec::with_capacity(key_count + 3);
    ops.push(Operation::new(op_m));

    for point in points {
        if !is_public_key(point) {
            return Vec::new();
        }
        ops.push(Operation::push(point.clone()));
    }

    ops.push(Operation::new(op_n));
    ops.push(Operation::new(Opcode::CheckMultisig));
    ops
}

pub fn to_pay_key_hash_pattern(hash: &ShortHash) -> Vec<Operation> {
    vec![
        Operation::new(Opcode::Dup),
        Operation::new(Opcode::Hash160),
        Operation::push(hash.to_vec()),
        Operation::new(Opcode::EqualVerify),
        Operation::new(Opcode::CheckSig),
    ]
}

pub fn to_pay_script_hash_pattern(hash: &ShortHash) -> Vec<Operation> {
    vec![
        Operation::new(Opcode::Hash160),
        Operation::push(hash.to_vec()),
        Operation::new(Opcode::Equal),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::Serializable;

    fn compressed_key(seed: u8) -> ByteString {
        let mut key = vec![seed; 33];
        key[0] = 0x02;
        key
    }

    fn uncompressed_key(seed: u8) -> ByteString {
        let mut key = vec![seed; 65];
        key[0] = 0x04;
        key
    }

    fn signature() -> Operation {
        Operation::push(vec![0x30; 71])
    }

    #[test]
    fn test_is_public_key() {
        assert!(is_public_key(&compressed_key(1)));
        assert!(is_public_key(&uncompressed_key(1)));

        let mut odd = compressed_key(1);
        odd[0] = 0x03;
        assert!(is_public_key(&odd));

        let mut bad_prefix = compressed_key(1);
        bad_prefix[0] = 0x04;
        assert!(!is_public_key(&bad_prefix));
        assert!(!is_public_key(&[0x02; 32]));
        assert!(!is_public_key(&[]));
    }

    #[test]
    fn test_pay_key_hash_matches_only_itself() {
        let ops = to_pay_key_hash_pattern(&[0xab; 20]);
        assert!(is_pay_key_hash_pattern(&ops));
        assert!(!is_null_data_pattern(&ops));
        assert!(!is_pay_multisig_pattern(&ops));
        assert!(!is_pay_public_key_pattern(&ops));
        assert!(!is_pay_script_hash_pattern(&ops));
        assert!(!is_sign_multisig_pattern(&ops));
        assert!(!is_sign_public_key_pattern(&ops));
        assert!(!is_sign_key_hash_pattern(&ops));
        assert!(!is_sign_script_hash_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::PayKeyHash);
    }

    #[test]
    fn test_pay_key_hash_rejects_wrong_hash_size() {
        let mut ops = to_pay_key_hash_pattern(&[0xab; 20]);
        ops[2] = Operation::push(vec![0xab; 19]);
        assert!(!is_pay_key_hash_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::NonStandard);
    }

    #[test]
    fn test_pay_script_hash() {
        let ops = to_pay_script_hash_pattern(&[0x11; 20]);
        assert_eq!(ops.len(), 3);
        assert_eq!(pattern(&ops), ScriptPattern::PayScriptHash);
    }

    #[test]
    fn test_null_data_limits() {
        let ops = to_null_data_pattern(&[0x42; 80]);
        assert_eq!(ops[1].code, Opcode::PushData1);
        assert!(is_null_data_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::NullData);

        assert!(to_null_data_pattern(&[0x42; 81]).is_empty());

        let oversized = vec![
            Operation::new(Opcode::Return),
            Operation::push(vec![0x42; 81]),
        ];
        assert!(!is_null_data_pattern(&oversized));

        let empty = to_null_data_pattern(&[]);
        assert_eq!(empty[1].code, Opcode::Zero);
        assert!(is_null_data_pattern(&empty));
    }

    #[test]
    fn test_pay_public_key() {
        let ops = to_pay_public_key_pattern(&uncompressed_key(7));
        assert_eq!(pattern(&ops), ScriptPattern::PayPublicKey);
        assert!(to_pay_public_key_pattern(&[0x02; 10]).is_empty());
    }

    #[test]
    fn test_pay_multisig_builder_and_predicate() {
        let keys = vec![compressed_key(1), compressed_key(2), uncompressed_key(3)];
        let ops = to_pay_multisig_pattern(2, &keys);
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[0].code, Opcode::Op2);
        assert_eq!(ops[4].code, Opcode::Op3);
        assert!(is_pay_multisig_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::PayMultisig);

        let single = to_pay_multisig_pattern(1, &keys[..1]);
        assert!(is_pay_multisig_pattern(&single));
    }

    #[test]
    fn test_pay_multisig_builder_rejects() {
        let keys = vec![compressed_key(1), compressed_key(2)];
        assert!(to_pay_multisig_pattern(0, &keys).is_empty());
        assert!(to_pay_multisig_pattern(3, &keys).is_empty());
        assert!(to_pay_multisig_pattern(1, &[]).is_empty());

        let many: Vec<ByteString> = (0..17).map(compressed_key).collect();
        assert!(to_pay_multisig_pattern(1, &many).is_empty());
        assert!(!to_pay_multisig_pattern(1, &many[..16]).is_empty());

        let bad = vec![compressed_key(1), vec![0x05; 33]];
        assert!(to_pay_multisig_pattern(1, &bad).is_empty());
    }

    #[test]
    fn test_pay_multisig_predicate_rejects_count_mismatch() {
        let keys = vec![compressed_key(1), compressed_key(2)];
        let mut ops = to_pay_multisig_pattern(1, &keys);
        ops[3] = Operation::new(Opcode::Op3);
        assert!(!is_pay_multisig_pattern(&ops));

        let mut ops = to_pay_multisig_pattern(2, &keys);
        ops[0] = Operation::new(Opcode::Op3);
        assert!(!is_pay_multisig_pattern(&ops));

        // OP_2 declares two keys; a single key is one short.
        let one_short = vec![
            Operation::new(Opcode::Op1),
            Operation::push(compressed_key(1)),
            Operation::new(Opcode::Op2),
            Operation::new(Opcode::CheckMultisig),
        ];
        assert!(!is_pay_multisig_pattern(&one_short));
    }

    #[test]
    fn test_sign_patterns() {
        let multisig = vec![Operation::new(Opcode::Zero), signature(), signature()];
        assert_eq!(pattern(&multisig), ScriptPattern::SignMultisig);

        let public_key = vec![signature()];
        assert_eq!(pattern(&public_key), ScriptPattern::SignPublicKey);

        let key_hash = vec![signature(), Operation::push(compressed_key(9))];
        assert_eq!(pattern(&key_hash), ScriptPattern::SignKeyHash);

        let not_push = vec![signature(), Operation::new(Opcode::Dup)];
        assert_eq!(pattern(&not_push), ScriptPattern::NonStandard);
    }

    #[test]
    fn test_sign_script_hash() {
        let redeem = Script::new(to_pay_multisig_pattern(
            1,
            &[compressed_key(1), compressed_key(2)],
        ));
        let ops = vec![signature(), Operation::push(redeem.to_data_with(false))];
        assert!(is_sign_script_hash_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::SignScriptHash);
    }

    #[test]
    fn test_sign_script_hash_checks_one_level() {
        // A P2SH redeem script is accepted without looking further.
        let redeem = Script::new(to_pay_script_hash_pattern(&[0x33; 20]));
        let ops = vec![signature(), Operation::push(redeem.to_data_with(false))];
        assert!(is_sign_script_hash_pattern(&ops));

        // A redeem script that is itself an input template is not.
        let inner = Script::new(vec![signature(), signature()]);
        let ops = vec![signature(), Operation::push(inner.to_data_with(false))];
        assert!(!is_sign_script_hash_pattern(&ops));
    }

    #[test]
    fn test_sign_script_hash_rejects_malformed_redeem() {
        // Declares a 5-byte push with 1 byte present.
        let ops = vec![signature(), Operation::push(vec![0x05, 0x01])];
        assert!(!is_sign_script_hash_pattern(&ops));
        assert_eq!(pattern(&ops), ScriptPattern::NonStandard);

        let ops = vec![signature(), Operation::new(Opcode::Zero)];
        assert!(!is_sign_script_hash_pattern(&ops));
    }

    #[test]
    fn test_builder_round_trips_through_bytes() {
        let ops = to_pay_key_hash_pattern(&[0x01; 20]);
        let data = Script::new(ops.clone()).to_data();
        assert_eq!(data.len(), 26);
        assert_eq!(Script::from_bytes(&data).unwrap().operations, ops);
    }
}
