use bitcoin::hashes::{sha256d, Hash};
use bitcoin::secp256k1::{self, ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use bitcoin::ScriptBuf;
use lightning::ln::chan_utils::make_funding_redeemscript;

/// The digest signed by gossip signatures: the double-SHA256 of the
/// serialized message after its signature fields.
pub fn gossip_digest(signed_data: &[u8]) -> Message {
    let hash = sha256d::Hash::hash(signed_data);
    Message::from_digest(hash.to_byte_array())
}

/// Verify a compact ECDSA gossip signature over `signed_data`.
pub fn verify_gossip_signature<C: secp256k1::Verification>(
    secp_ctx: &Secp256k1<C>,
    signed_data: &[u8],
    sig: &Signature,
    pubkey: &PublicKey,
) -> bool {
    secp_ctx.verify_ecdsa(&gossip_digest(signed_data), sig, pubkey).is_ok()
}

/// Sign `signed_data` the way a gossip originator does.
pub fn sign_gossip<C: secp256k1::Signing>(
    secp_ctx: &Secp256k1<C>,
    signed_data: &[u8],
    secret: &SecretKey,
) -> Signature {
    secp_ctx.sign_ecdsa(&gossip_digest(signed_data), secret)
}

/// The P2WSH scriptPubKey of a channel funding output, the 2-of-2 multisig
/// of the two funding keys in lexicographic order.
pub fn funding_script_pubkey(bitcoin_key_1: &PublicKey, bitcoin_key_2: &PublicKey) -> ScriptBuf {
    make_funding_redeemscript(bitcoin_key_1, bitcoin_key_2).to_p2wsh()
}
