//! Program-derived address helpers

use solana_sdk::pubkey::Pubkey;

/// Meteora DAMM v2 (cp-amm) program
pub const DAMM_V2_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG");

pub const POSITION_SEED: &[u8] = b"position";

/// Position PDA and bump for a position NFT mint
pub fn derive_position_pda_with_bump(nft_mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POSITION_SEED, nft_mint.as_ref()], program_id)
}

/// Position account address owned by the DAMM v2 program for `nft_mint`
pub fn derive_position_pda(nft_mint: &Pubkey) -> Pubkey {
    derive_position_pda_with_bump(nft_mint, &DAMM_V2_PROGRAM_ID).0
}
