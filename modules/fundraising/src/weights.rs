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

//! Autogenerated weights for module_fundraising
//!
//! THIS FILE WAS AUTO-GENERATED USING THE SUBSTRATE BENCHMARK CLI VERSION 4.0.0-dev

#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(clippy::unnecessary_cast)]

use frame_support::{
	traits::Get,
	weights::{constants::RocksDbWeight, Weight},
};
use sp_std::marker::PhantomData;

/// Weight functions needed for module_fundraising.
pub trait WeightInfo {
	fn create_fixed_price_auction() -> Weight;
	fn create_batch_auction() -> Weight;
	fn cancel_auction() -> Weight;
	fn place_bid() -> Weight;
	fn add_allowed_bidders(b: u32) -> Weight;
	fn update_allowed_bidder() -> Weight;
}

/// Weights for module_fundraising using the Launchpad node and recommended hardware.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn create_fixed_price_auction() -> Weight {
		Weight::from_parts(92_817_000, 6196)
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().writes(6))
	}
	fn create_batch_auction() -> Weight {
		Weight::from_parts(95_243_000, 6196)
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().writes(6))
	}
	fn cancel_auction() -> Weight {
		Weight::from_parts(64_715_000, 4687)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(4))
	}
	fn place_bid() -> Weight {
		Weight::from_parts(87_346_000, 6196)
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().writes(6))
	}
	fn add_allowed_bidders(b: u32) -> Weight {
		Weight::from_parts(31_295_000, 3541)
			// Standard Error: 2_000
			.saturating_add(Weight::from_parts(4_075_000, 0).saturating_mul(b as u64))
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1).saturating_mul(b as u64))
	}
	fn update_allowed_bidder() -> Weight {
		Weight::from_parts(33_108_000, 3541)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

// For backwards compatibility and tests
impl WeightInfo for () {
	fn create_fixed_price_auction() -> Weight {
		Weight::from_parts(92_817_000, 6196)
			.saturating_add(RocksDbWeight::get().reads(5))
			.saturating_add(RocksDbWeight::get().writes(6))
	}
	fn create_batch_auction() -> Weight {
		Weight::from_parts(95_243_000, 6196)
			.saturating_add(RocksDbWeight::get().reads(5))
			.saturating_add(RocksDbWeight::get().writes(6))
	}
	fn cancel_auction() -> Weight {
		Weight::from_parts(64_715_000, 4687)
			.saturating_add(RocksDbWeight::get().reads(3))
			.saturating_add(RocksDbWeight::get().writes(4))
	}
	fn place_bid() -> Weight {
		Weight::from_parts(87_346_000, 6196)
			.saturating_add(RocksDbWeight::get().reads(5))
			.saturating_add(RocksDbWeight::get().writes(6))
	}
	fn add_allowed_bidders(b: u32) -> Weight {
		Weight::from_parts(31_295_000, 3541)
			// Standard Error: 2_000
			.saturating_add(Weight::from_parts(4_075_000, 0).saturating_mul(b as u64))
			.saturating_add(RocksDbWeight::get().reads(1))
			.saturating_add(RocksDbWeight::get().writes(1).saturating_mul(b as u64))
	}
	fn update_allowed_bidder() -> Weight {
		Weight::from_parts(33_108_000, 3541)
			.saturating_add(RocksDbWeight::get().reads(2))
			.saturating_add(RocksDbWeight::get().writes(1))
	}
}
