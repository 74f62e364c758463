//! It exposes a transfer hook for escrowing an NFT under descending price
//! auction terms and a bid function for buying it at the currently implied
//! price.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod nft;
mod pricing;
mod state;
mod token;
