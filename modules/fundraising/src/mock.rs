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

//! Mocks for the fundraising module.

#![cfg(test)]

use super::*;
use crate as fundraising;

use frame_support::{
	construct_runtime, derive_impl, parameter_types,
	traits::{ConstU64, Nothing},
};
use orml_traits::parameter_type_with_key;
use primitives::{Amount, Moment, TokenSymbol};
use sp_runtime::{traits::IdentityLookup, AccountId32, BuildStorage};

pub type AccountId = AccountId32;
pub type BlockNumber = u64;

pub const PAD: CurrencyId = CurrencyId::Token(TokenSymbol::PAD);
pub const USDP: CurrencyId = CurrencyId::Token(TokenSymbol::USDP);
pub const SEED: CurrencyId = CurrencyId::Token(TokenSymbol::SEED);
pub const DOT: CurrencyId = CurrencyId::Token(TokenSymbol::DOT);

pub const ALICE: AccountId = AccountId32::new([1u8; 32]);
pub const BOB: AccountId = AccountId32::new([2u8; 32]);
pub const CAROL: AccountId = AccountId32::new([3u8; 32]);
pub const DAVE: AccountId = AccountId32::new([4u8; 32]);
pub const TREASURY: AccountId = AccountId32::new([9u8; 32]);

pub const INITIAL_NATIVE_BALANCE: Balance = 1_000_000_000_000;
pub const CREATION_FEE: Balance = 100_000_000;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig as frame_system::DefaultConfig)]
impl frame_system::Config for Runtime {
	type AccountId = AccountId;
	type Lookup = IdentityLookup<Self::AccountId>;
	type Block = Block;
	type AccountData = ();
}

impl pallet_timestamp::Config for Runtime {
	type Moment = Moment;
	type OnTimestampSet = ();
	type MinimumPeriod = ConstU64<1000>;
	type WeightInfo = ();
}

parameter_type_with_key! {
	pub ExistentialDeposits: |_currency_id: CurrencyId| -> Balance {
		Default::default()
	};
}

impl orml_tokens::Config for Runtime {
	type RuntimeEvent = RuntimeEvent;
	type Balance = Balance;
	type Amount = Amount;
	type CurrencyId = CurrencyId;
	type WeightInfo = ();
	type ExistentialDeposits = ExistentialDeposits;
	type CurrencyHooks = ();
	type MaxLocks = ();
	type MaxReserves = ();
	type ReserveIdentifier = [u8; 8];
	type DustRemovalWhitelist = Nothing;
}

parameter_types! {
	pub const FundraisingPalletId: PalletId = PalletId(*b"lpd/fund");
	pub const GetNativeCurrencyId: CurrencyId = PAD;
	pub const AuctionCreationFee: Balance = CREATION_FEE;
	pub TreasuryAccount: AccountId = TREASURY;
	// One day in milliseconds.
	pub const ExtendedPeriod: Moment = 86_400_000;
	pub const MaxExtendedRoundLimit: u32 = 30;
	pub const MaxVestingSchedules: u32 = 100;
}

impl fundraising::Config for Runtime {
	type RuntimeEvent = RuntimeEvent;
	type Currency = Tokens;
	type Time = Timestamp;
	type GetNativeCurrencyId = GetNativeCurrencyId;
	type AuctionCreationFee = AuctionCreationFee;
	type TreasuryAccount = TreasuryAccount;
	type ExtendedPeriod = ExtendedPeriod;
	type MaxExtendedRoundLimit = MaxExtendedRoundLimit;
	type MaxVestingSchedules = MaxVestingSchedules;
	type PalletId = FundraisingPalletId;
	type WeightInfo = ();
}

type Block = frame_system::mocking::MockBlock<Runtime>;

construct_runtime!(
	pub enum Runtime {
		System: frame_system,
		Timestamp: pallet_timestamp,
		Tokens: orml_tokens,
		FundraisingModule: fundraising,
	}
);

pub struct ExtBuilder {
	balances: Vec<(AccountId, CurrencyId, Balance)>,
}

impl Default for ExtBuilder {
	fn default() -> Self {
		Self {
			balances: vec![
				(ALICE, PAD, INITIAL_NATIVE_BALANCE),
				(BOB, PAD, INITIAL_NATIVE_BALANCE),
				(CAROL, PAD, INITIAL_NATIVE_BALANCE),
				(DAVE, PAD, INITIAL_NATIVE_BALANCE),
			],
		}
	}
}

impl ExtBuilder {
	pub fn balances(mut self, mut balances: Vec<(AccountId, CurrencyId, Balance)>) -> Self {
		self.balances.append(&mut balances);
		self
	}

	pub fn build(self) -> sp_io::TestExternalities {
		let mut t = frame_system::GenesisConfig::<Runtime>::default()
			.build_storage()
			.unwrap();

		orml_tokens::GenesisConfig::<Runtime> {
			balances: self.balances,
		}
		.assimilate_storage(&mut t)
		.unwrap();

		let mut ext = sp_io::TestExternalities::new(t);
		ext.execute_with(|| System::set_block_number(1));
		ext
	}
}
