// This file is part of Launchpad.

// Copyright (C) 2020-2023 Launchpad Foundation.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Low-level types used throughout the Launchpad code.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod currency;

use sp_runtime::{
	generic,
	traits::{BlakeTwo256, IdentifyAccount, Verify},
	MultiSignature,
};

pub use currency::{CurrencyId, TokenSymbol};

/// Block number type used by the chain.
pub type BlockNumber = u32;

/// Transaction signature, any of the supported crypto flavours.
pub type Signature = MultiSignature;

/// Public key behind a [`Signature`].
pub type AccountPublic = <Signature as Verify>::Signer;

/// On-chain account identifier: 32 bytes derived from the signing key.
pub type AccountId = <AccountPublic as IdentifyAccount>::AccountId;

/// Per-account transaction counter.
pub type Nonce = u32;

/// Output of the chain's hashing algorithm.
pub type Hash = sp_core::H256;

/// An instant or duration in time, in milliseconds.
pub type Moment = u64;

/// Amount of a fungible token held by an account.
pub type Balance = u128;

/// Signed counterpart of [`Balance`], used for deltas.
pub type Amount = i128;

/// Identifier of an auction. Assigned by a global counter, starting at 1.
pub type AuctionId = u64;

/// Sequence number of a bid within one auction. Starts at 1.
pub type BidSequence = u64;

/// Block header, hashed with [`BlakeTwo256`].
pub type Header = generic::Header<BlockNumber, BlakeTwo256>;

/// Block as understood outside the runtime, with opaque extrinsics.
pub type Block = generic::Block<Header, UncheckedExtrinsic>;

pub use sp_runtime::OpaqueExtrinsic as UncheckedExtrinsic;
