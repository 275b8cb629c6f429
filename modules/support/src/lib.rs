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

//! Types and traits shared between Launchpad modules.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::pallet_prelude::DispatchResult;
use sp_runtime::FixedU128;
use sp_std::prelude::*;

/// A fixed-precision price of one selling coin expressed in paying coin,
/// 10^18 scale.
pub type Price = FixedU128;

/// A fixed-precision rate in [0, 1], 10^18 scale.
pub type Rate = FixedU128;

/// A fixed-precision ratio, 10^18 scale.
pub type Ratio = FixedU128;

/// An abstraction of the fundraising module for other modules.
///
/// Allowed-bidder bookkeeping does not verify the caller: modules composing
/// with fundraising are expected to layer their own gating on top.
pub trait FundraisingManager<AccountId> {
	type AuctionId;
	type Balance;

	/// Append new allowed bidders with their maximum bid amounts.
	fn add_allowed_bidders(
		auction_id: Self::AuctionId,
		bidders: Vec<(AccountId, Self::Balance)>,
	) -> DispatchResult;

	/// Update the maximum bid amount of an already-allowed bidder.
	fn update_allowed_bidder(
		auction_id: Self::AuctionId,
		bidder: AccountId,
		max_bid_amount: Self::Balance,
	) -> DispatchResult;
}
