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

//! # Fundraising Module
//!
//! ## Overview
//!
//! Auction a quantity of a selling asset against a paying asset. An
//! auctioneer locks the selling coin in a per-auction reserve; bidders
//! deposit paying coin in exchange for a claim on the selling coin. Auction
//! types include:
//!   - `fixed price auction`: every bid is taken at the fixed start price
//!     until the selling coin runs out
//!   - `batch auction`: bids are collected and matched at a single uniform
//!     clearing price when the auction closes, with optional extended rounds
//!
//! Paying coin collected from winning bids is handed to the auctioneer
//! through a vesting queue: the paying pool is split into weighted tranches
//! which are released one by one as their release time elapses.
//!
//! Time-dependent state transitions are driven once per block from
//! `on_finalize`. Each auction is processed in its own storage transaction so
//! a failure in one auction cannot leak partial writes into another.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::unused_unit)]

use frame_support::{pallet_prelude::*, storage::with_transaction, traits::Time, transactional, PalletId};
use frame_system::pallet_prelude::*;
use orml_traits::MultiCurrency;
use primitives::{AuctionId, Balance, BidSequence, CurrencyId};
use sp_core::U256;
use sp_runtime::{
	traits::{AccountIdConversion, CheckedAdd, One, Saturating, Zero},
	ArithmeticError, DispatchError, DispatchResult, FixedPointNumber, RuntimeDebug, TransactionOutcome,
};
use sp_std::{cmp::Ordering, collections::btree_set::BTreeSet, prelude::*, vec};
use support::{FundraisingManager, Price, Rate, Ratio};

mod mock;
pub mod weights;

pub use module::*;
pub use weights::WeightInfo;

/// Status of an auction.
#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum AuctionStatus {
	/// Created but not started yet.
	StandBy,
	/// Accepting bids.
	Started,
	/// Closed, paying coin is locked in the vesting reserve waiting for its
	/// release times.
	Vesting,
	/// All payouts done.
	Finished,
	/// Cancelled by the auctioneer before start.
	Cancelled,
}

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum AuctionType {
	FixedPrice,
	Batch,
}

/// How a bid is denominated.
#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum BidType {
	/// Paying coin at the fixed start price.
	FixedPrice,
	/// Batch bid denominated in paying coin (how much the bidder is willing
	/// to spend).
	BatchWorth,
	/// Batch bid denominated in selling coin (how many coins the bidder
	/// wants).
	BatchMany,
}

/// One tranche of the auctioneer payout: `weight` of the paying pool becomes
/// claimable at `release_time`.
#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct VestingSchedule<Moment> {
	pub release_time: Moment,
	pub weight: Rate,
}

/// A materialized vesting tranche waiting in the queue for its release time.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct VestingQueueEntry<AccountId, Moment> {
	pub release_time: Moment,
	pub auctioneer: AccountId,
	#[codec(compact)]
	pub paying_amount: Balance,
	pub released: bool,
}

/// A bidder together with the maximum amount it is allowed to bid.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct AllowedBidder<AccountId> {
	pub bidder: AccountId,
	#[codec(compact)]
	pub max_bid_amount: Balance,
}

/// Fields shared by all auction types.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct BaseAuction<AccountId, Moment> {
	/// Creator of the auction, receives the paying coin.
	pub auctioneer: AccountId,
	/// Starting price: paying coin per one selling coin.
	pub start_price: Price,
	pub selling_currency_id: CurrencyId,
	/// Amount of selling coin locked at creation.
	#[codec(compact)]
	pub selling_amount: Balance,
	pub paying_currency_id: CurrencyId,
	/// Tranches the paying pool is split into, ordered by release time.
	pub vesting_schedules: Vec<VestingSchedule<Moment>>,
	/// Uniform clearing price, zero until a batch auction has cleared.
	pub winning_price: Price,
	pub num_winning_bidders: u32,
	/// Selling coin not yet committed to bids.
	#[codec(compact)]
	pub remaining_selling_amount: Balance,
	pub start_time: Moment,
	/// `end_times[0]` is the originally scheduled end; batch extended rounds
	/// append to it.
	pub end_times: Vec<Moment>,
	pub status: AuctionStatus,
}

/// A batch auction: the base fields plus extended-round parameters.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct BatchAuction<AccountId, Moment> {
	pub base: BaseAuction<AccountId, Moment>,
	/// Number of extra bidding rounds allowed after the scheduled end.
	pub max_extended_round: u32,
	/// Winner-count change ratio above which another round is opened.
	pub extended_round_rate: Rate,
}

/// An auction of either type. The variant set is closed, behavior is
/// dispatched on the type tag where it differs.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub enum Auction<AccountId, Moment> {
	FixedPrice(BaseAuction<AccountId, Moment>),
	Batch(BatchAuction<AccountId, Moment>),
}

impl<AccountId, Moment: Copy + PartialOrd> Auction<AccountId, Moment> {
	pub fn base(&self) -> &BaseAuction<AccountId, Moment> {
		match self {
			Auction::FixedPrice(base) => base,
			Auction::Batch(batch) => &batch.base,
		}
	}

	pub fn base_mut(&mut self) -> &mut BaseAuction<AccountId, Moment> {
		match self {
			Auction::FixedPrice(base) => base,
			Auction::Batch(batch) => &mut batch.base,
		}
	}

	pub fn auction_type(&self) -> AuctionType {
		match self {
			Auction::FixedPrice(_) => AuctionType::FixedPrice,
			Auction::Batch(_) => AuctionType::Batch,
		}
	}

	/// `(max_extended_round, extended_round_rate)` for batch auctions.
	pub fn batch_params(&self) -> Option<(u32, Rate)> {
		match self {
			Auction::FixedPrice(_) => None,
			Auction::Batch(batch) => Some((batch.max_extended_round, batch.extended_round_rate)),
		}
	}

	pub fn status(&self) -> AuctionStatus {
		self.base().status
	}

	/// Whether the start time has been reached at `now`.
	pub fn started_by(&self, now: Moment) -> bool {
		self.base().start_time <= now
	}

	/// Whether the last scheduled end time has been reached at `now`.
	pub fn ended_by(&self, now: Moment) -> bool {
		self.base().end_times.last().map_or(false, |&end_time| now >= end_time)
	}

	/// Number of extended rounds already appended.
	pub fn extended_rounds(&self) -> u32 {
		self.base().end_times.len().saturating_sub(1) as u32
	}
}

/// A single sequenced bid. The auction id and sequence number are the storage
/// key of the bid.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct Bid<AccountId, BlockNumber> {
	pub bidder: AccountId,
	pub bid_type: BidType,
	/// Limit price: paying coin per one selling coin.
	pub price: Price,
	pub currency_id: CurrencyId,
	#[codec(compact)]
	pub amount: Balance,
	/// Block the bid was recorded at.
	pub height: BlockNumber,
	/// Set by batch clearing; always true for distributed fixed price bids.
	pub is_winner: bool,
}

impl<AccountId, BlockNumber> Bid<AccountId, BlockNumber> {
	/// The bid expressed in paying coin, truncated toward zero.
	pub fn paying_amount(&self) -> Option<Balance> {
		match self.bid_type {
			BidType::FixedPrice | BidType::BatchWorth => fixed_mul_truncated(self.amount, self.price),
			BidType::BatchMany => Some(self.amount),
		}
	}
}

/// Outcome of a uniform clearing price computation over the bids of one batch
/// auction.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct BatchAuctionResult {
	pub clearing_price: Price,
	#[codec(compact)]
	pub sold_amount: Balance,
	/// Sequences of the winning bids.
	pub winners: Vec<BidSequence>,
}

/// Domain tag of a per-auction reserve sub-account.
#[derive(Clone, Copy, Encode)]
enum ReservePool {
	Selling,
	Paying,
	Vesting,
}

/// `amount * rate`, truncated toward zero.
fn fixed_mul_truncated(amount: Balance, rate: Rate) -> Option<Balance> {
	let product = U256::from(amount).checked_mul(U256::from(rate.into_inner()))?;
	Balance::try_from(product / U256::from(Rate::accuracy())).ok()
}

/// `amount / rate`, truncated toward zero. `None` if `rate` is zero.
fn fixed_div_truncated(amount: Balance, rate: Rate) -> Option<Balance> {
	if rate.is_zero() {
		return None;
	}
	let scaled = U256::from(amount).checked_mul(U256::from(Rate::accuracy()))?;
	Balance::try_from(scaled / U256::from(rate.into_inner())).ok()
}

#[frame_support::pallet]
pub mod module {
	use super::*;

	pub type MomentOf<T> = <<T as Config>::Time as Time>::Moment;

	#[pallet::config]
	pub trait Config: frame_system::Config {
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		/// Currency to transfer assets.
		type Currency: MultiCurrency<Self::AccountId, CurrencyId = CurrencyId, Balance = Balance>;

		/// Time provider. All auction times are block times from this source.
		type Time: Time;

		#[pallet::constant]
		/// The native currency id, the denomination of the auction creation
		/// fee.
		type GetNativeCurrencyId: Get<CurrencyId>;

		#[pallet::constant]
		/// Fee charged to the auctioneer on auction creation.
		type AuctionCreationFee: Get<Balance>;

		#[pallet::constant]
		/// Account the auction creation fee is collected into.
		type TreasuryAccount: Get<Self::AccountId>;

		#[pallet::constant]
		/// Duration of one batch-auction extended round.
		type ExtendedPeriod: Get<MomentOf<Self>>;

		#[pallet::constant]
		/// Upper bound of `max_extended_round` accepted at creation.
		type MaxExtendedRoundLimit: Get<u32>;

		#[pallet::constant]
		/// Upper bound of the number of vesting schedules per auction.
		type MaxVestingSchedules: Get<u32>;

		#[pallet::constant]
		/// The module id, keeps all the auction reserve sub-accounts.
		type PalletId: Get<PalletId>;

		/// Weight information for the extrinsics in this module.
		type WeightInfo: WeightInfo;
	}

	#[pallet::error]
	pub enum Error<T> {
		/// The auction does not exist
		AuctionNotFound,
		/// The bidder is not in the allowed bidder list of the auction
		BidderNotFound,
		/// Invalid parameters in the request
		InvalidRequest,
		/// The operation is not allowed in the current auction status
		InvalidAuctionStatus,
		/// The end time must be in the future and after the start time
		InvalidEndTime,
		/// A fixed price bid must use the start price of the auction
		InvalidStartPrice,
		/// The bidder cannot cover the paying amount of the bid
		InsufficientFunds,
		/// The maximum bid amount must be positive
		InvalidMaxBidAmount,
		/// The allowed bidder list must not be empty
		EmptyAllowedBidders,
		/// Vesting weights must be in (0, 1] and sum to one, release times
		/// must be chronological and after the end time
		InvalidVestingSchedules,
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(crate) fn deposit_event)]
	pub enum Event<T: Config> {
		/// A fixed price auction was created.
		FixedPriceAuctionCreated {
			auction_id: AuctionId,
			auctioneer: T::AccountId,
			start_price: Price,
			selling_currency_id: CurrencyId,
			selling_amount: Balance,
			paying_currency_id: CurrencyId,
			start_time: MomentOf<T>,
			end_time: MomentOf<T>,
			status: AuctionStatus,
		},
		/// A batch auction was created.
		BatchAuctionCreated {
			auction_id: AuctionId,
			auctioneer: T::AccountId,
			start_price: Price,
			selling_currency_id: CurrencyId,
			selling_amount: Balance,
			paying_currency_id: CurrencyId,
			start_time: MomentOf<T>,
			end_time: MomentOf<T>,
			status: AuctionStatus,
			max_extended_round: u32,
			extended_round_rate: Rate,
		},
		/// A stand-by auction was cancelled by its auctioneer.
		AuctionCancelled { auction_id: AuctionId },
		/// A bid was recorded.
		BidPlaced {
			auction_id: AuctionId,
			sequence: BidSequence,
			bidder: T::AccountId,
			bid_type: BidType,
			price: Price,
			currency_id: CurrencyId,
			amount: Balance,
			paying_amount: Balance,
		},
		/// New allowed bidders were added to an auction.
		AllowedBiddersAdded { auction_id: AuctionId, count: u32 },
		/// The maximum bid amount of an allowed bidder was updated.
		AllowedBidderUpdated {
			auction_id: AuctionId,
			bidder: T::AccountId,
			max_bid_amount: Balance,
		},
	}

	/// Mapping from auction id to auction info
	#[pallet::storage]
	#[pallet::getter(fn auctions)]
	pub type Auctions<T: Config> =
		StorageMap<_, Twox64Concat, AuctionId, Auction<T::AccountId, MomentOf<T>>, OptionQuery>;

	/// Allowed bidders of an auction with their maximum bid amounts.
	/// AuctionId, Bidder -> MaxBidAmount
	#[pallet::storage]
	#[pallet::getter(fn allowed_bidders)]
	pub type AllowedBidders<T: Config> =
		StorageDoubleMap<_, Twox64Concat, AuctionId, Twox64Concat, T::AccountId, Balance, OptionQuery>;

	/// Append-only bid log. AuctionId, Sequence -> Bid
	#[pallet::storage]
	#[pallet::getter(fn bids)]
	pub type Bids<T: Config> = StorageDoubleMap<
		_,
		Twox64Concat,
		AuctionId,
		Twox64Concat,
		BidSequence,
		Bid<T::AccountId, BlockNumberFor<T>>,
		OptionQuery,
	>;

	/// Index of bids by bidder. Bidder, (AuctionId, Sequence) -> ()
	#[pallet::storage]
	#[pallet::getter(fn bid_indexes)]
	pub type BidIndexes<T: Config> =
		StorageDoubleMap<_, Twox64Concat, T::AccountId, Twox64Concat, (AuctionId, BidSequence), (), OptionQuery>;

	/// Vesting tranches of an auction, ordered by ascending release time.
	#[pallet::storage]
	#[pallet::getter(fn vesting_queues)]
	pub type VestingQueues<T: Config> =
		StorageMap<_, Twox64Concat, AuctionId, Vec<VestingQueueEntry<T::AccountId, MomentOf<T>>>, ValueQuery>;

	/// The id assigned to the most recently created auction. Auction ids form
	/// a contiguous range starting at 1.
	#[pallet::storage]
	#[pallet::getter(fn last_auction_id)]
	pub type LastAuctionId<T: Config> = StorageValue<_, AuctionId, ValueQuery>;

	/// The sequence assigned to the most recent bid of an auction.
	#[pallet::storage]
	#[pallet::getter(fn last_bid_sequence)]
	pub type LastBidSequence<T: Config> = StorageMap<_, Twox64Concat, AuctionId, BidSequence, ValueQuery>;

	/// Winner count of the previous batch clearing round, used to decide
	/// whether another extended round is needed.
	#[pallet::storage]
	#[pallet::getter(fn winning_bids_len)]
	pub type WinningBidsLen<T: Config> = StorageMap<_, Twox64Concat, AuctionId, u32, ValueQuery>;

	#[pallet::pallet]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::hooks]
	impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
		/// Advance time-dependent auction state at the end of each block.
		///
		/// Each auction is processed inside its own storage transaction:
		/// a failure rolls back that auction only and the driver moves on.
		fn on_finalize(_n: BlockNumberFor<T>) {
			let now = T::Time::now();
			for auction_id in 1..=Self::last_auction_id() {
				let result: DispatchResult = with_transaction(|| match Self::process_auction(auction_id, now) {
					Ok(()) => TransactionOutcome::Commit(Ok(())),
					Err(e) => TransactionOutcome::Rollback(Err(e)),
				});
				if let Err(e) = result {
					log::error!(
						target: "fundraising",
						"end-block processing of auction {:?} failed and was rolled back: {:?}",
						auction_id, e,
					);
				}
			}
		}

		#[cfg(feature = "try-runtime")]
		fn try_state(_n: BlockNumberFor<T>) -> Result<(), sp_runtime::TryRuntimeError> {
			Self::do_try_state().map_err(sp_runtime::TryRuntimeError::Other)
		}
	}

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		/// Create a fixed price auction. The selling coin is locked in the
		/// selling reserve and the creation fee is collected immediately.
		///
		/// - `start_price`: paying coin per one selling coin, every bid must
		///   use exactly this price
		/// - `vesting_schedules`: may be empty, in which case the paying coin
		///   is released to the auctioneer as soon as the auction closes
		#[pallet::call_index(0)]
		#[pallet::weight(<T as Config>::WeightInfo::create_fixed_price_auction())]
		#[transactional]
		pub fn create_fixed_price_auction(
			origin: OriginFor<T>,
			start_price: Price,
			selling_currency_id: CurrencyId,
			#[pallet::compact] selling_amount: Balance,
			paying_currency_id: CurrencyId,
			vesting_schedules: Vec<VestingSchedule<MomentOf<T>>>,
			start_time: MomentOf<T>,
			end_time: MomentOf<T>,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			Self::validate_auction_params(
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				&vesting_schedules,
				start_time,
				end_time,
			)?;

			let (auction_id, status) = Self::do_create_auction(
				&who,
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				vesting_schedules,
				start_time,
				end_time,
				None,
			)?;

			Self::deposit_event(Event::FixedPriceAuctionCreated {
				auction_id,
				auctioneer: who,
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				start_time,
				end_time,
				status,
			});
			Ok(())
		}

		/// Create a batch auction. Bids are matched at a uniform clearing
		/// price when the auction closes.
		///
		/// - `max_extended_round`: how many extra bidding rounds may be
		///   appended after the scheduled end, zero disables extension
		/// - `extended_round_rate`: winner-count change ratio that triggers
		///   another round, must be in (0, 1]
		#[pallet::call_index(1)]
		#[pallet::weight(<T as Config>::WeightInfo::create_batch_auction())]
		#[transactional]
		pub fn create_batch_auction(
			origin: OriginFor<T>,
			start_price: Price,
			selling_currency_id: CurrencyId,
			#[pallet::compact] selling_amount: Balance,
			paying_currency_id: CurrencyId,
			vesting_schedules: Vec<VestingSchedule<MomentOf<T>>>,
			start_time: MomentOf<T>,
			end_time: MomentOf<T>,
			max_extended_round: u32,
			extended_round_rate: Rate,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			Self::validate_auction_params(
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				&vesting_schedules,
				start_time,
				end_time,
			)?;
			ensure!(
				!extended_round_rate.is_zero() && extended_round_rate <= Rate::one(),
				Error::<T>::InvalidRequest
			);
			ensure!(
				max_extended_round <= T::MaxExtendedRoundLimit::get(),
				Error::<T>::InvalidRequest
			);

			let (auction_id, status) = Self::do_create_auction(
				&who,
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				vesting_schedules,
				start_time,
				end_time,
				Some((max_extended_round, extended_round_rate)),
			)?;

			Self::deposit_event(Event::BatchAuctionCreated {
				auction_id,
				auctioneer: who,
				start_price,
				selling_currency_id,
				selling_amount,
				paying_currency_id,
				start_time,
				end_time,
				status,
				max_extended_round,
				extended_round_rate,
			});
			Ok(())
		}

		/// Cancel an auction that has not started yet. The locked selling
		/// coin is released back to the auctioneer.
		///
		/// Only callable by the auctioneer while the auction is in StandBy.
		#[pallet::call_index(2)]
		#[pallet::weight(<T as Config>::WeightInfo::cancel_auction())]
		#[transactional]
		pub fn cancel_auction(origin: OriginFor<T>, #[pallet::compact] auction_id: AuctionId) -> DispatchResult {
			let who = ensure_signed(origin)?;
			Self::do_cancel_auction(&who, auction_id)?;
			Self::deposit_event(Event::AuctionCancelled { auction_id });
			Ok(())
		}

		/// Place a bid on a started auction. The paying amount of the bid is
		/// moved to the paying reserve of the auction.
		///
		/// The bid type is implied: fixed price auctions take paying coin
		/// bids at the start price; batch auctions take paying coin bids
		/// (worth) or selling coin bids (how many) by the coin denomination.
		#[pallet::call_index(3)]
		#[pallet::weight(<T as Config>::WeightInfo::place_bid())]
		#[transactional]
		pub fn place_bid(
			origin: OriginFor<T>,
			#[pallet::compact] auction_id: AuctionId,
			price: Price,
			currency_id: CurrencyId,
			#[pallet::compact] amount: Balance,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			ensure!(!price.is_zero() && !amount.is_zero(), Error::<T>::InvalidRequest);

			let (sequence, bid_type, paying_amount) = Self::do_place_bid(&who, auction_id, price, currency_id, amount)?;

			Self::deposit_event(Event::BidPlaced {
				auction_id,
				sequence,
				bidder: who,
				bid_type,
				price,
				currency_id,
				amount,
				paying_amount,
			});
			Ok(())
		}

		/// Add new allowed bidders with their maximum bid amounts.
		///
		/// Only callable by the auctioneer. External modules can do the same
		/// without gating through `FundraisingManager`.
		#[pallet::call_index(4)]
		#[pallet::weight(<T as Config>::WeightInfo::add_allowed_bidders(bidders.len() as u32))]
		#[transactional]
		pub fn add_allowed_bidders(
			origin: OriginFor<T>,
			#[pallet::compact] auction_id: AuctionId,
			bidders: Vec<AllowedBidder<T::AccountId>>,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			Self::ensure_auctioneer(&who, auction_id)?;
			let count = bidders.len() as u32;
			Self::do_add_allowed_bidders(auction_id, bidders)?;
			Self::deposit_event(Event::AllowedBiddersAdded { auction_id, count });
			Ok(())
		}

		/// Update the maximum bid amount of an already-allowed bidder.
		///
		/// Only callable by the auctioneer.
		#[pallet::call_index(5)]
		#[pallet::weight(<T as Config>::WeightInfo::update_allowed_bidder())]
		#[transactional]
		pub fn update_allowed_bidder(
			origin: OriginFor<T>,
			#[pallet::compact] auction_id: AuctionId,
			bidder: T::AccountId,
			#[pallet::compact] max_bid_amount: Balance,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			Self::ensure_auctioneer(&who, auction_id)?;
			Self::do_update_allowed_bidder(auction_id, &bidder, max_bid_amount)?;
			Self::deposit_event(Event::AllowedBidderUpdated {
				auction_id,
				bidder,
				max_bid_amount,
			});
			Ok(())
		}
	}
}

impl<T: Config> Pallet<T> {
	/// The reserve addresses of an auction are sub-accounts of the module
	/// account, derived from a fixed domain tag and the auction id. They are
	/// predictable on every replica and hold no key material.
	fn reserve_account(pool: ReservePool, auction_id: AuctionId) -> T::AccountId {
		T::PalletId::get().into_sub_account_truncating((pool, auction_id))
	}

	/// Escrow of the selling coin while the auction runs.
	pub fn selling_reserve_account(auction_id: AuctionId) -> T::AccountId {
		Self::reserve_account(ReservePool::Selling, auction_id)
	}

	/// Escrow of the paying coin collected from bids.
	pub fn paying_reserve_account(auction_id: AuctionId) -> T::AccountId {
		Self::reserve_account(ReservePool::Paying, auction_id)
	}

	/// Escrow of the paying coin between auction close and vesting release.
	pub fn vesting_reserve_account(auction_id: AuctionId) -> T::AccountId {
		Self::reserve_account(ReservePool::Vesting, auction_id)
	}

	/// All bids of an auction ordered by ascending sequence.
	pub fn bids_of_auction(auction_id: AuctionId) -> Vec<(BidSequence, Bid<T::AccountId, BlockNumberFor<T>>)> {
		let mut bids: Vec<_> = Bids::<T>::iter_prefix(auction_id).collect();
		bids.sort_by_key(|(sequence, _)| *sequence);
		bids
	}

	fn ensure_auctioneer(who: &T::AccountId, auction_id: AuctionId) -> DispatchResult {
		let auction = Self::auctions(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
		ensure!(auction.base().auctioneer == *who, Error::<T>::InvalidRequest);
		Ok(())
	}

	/// Stateless checks shared by both auction types.
	fn validate_auction_params(
		start_price: Price,
		selling_currency_id: CurrencyId,
		selling_amount: Balance,
		paying_currency_id: CurrencyId,
		vesting_schedules: &[VestingSchedule<MomentOf<T>>],
		start_time: MomentOf<T>,
		end_time: MomentOf<T>,
	) -> DispatchResult {
		ensure!(!start_price.is_zero(), Error::<T>::InvalidRequest);
		ensure!(!selling_amount.is_zero(), Error::<T>::InvalidRequest);
		ensure!(selling_currency_id != paying_currency_id, Error::<T>::InvalidRequest);
		ensure!(end_time > start_time, Error::<T>::InvalidEndTime);
		Self::validate_vesting_schedules(vesting_schedules, end_time)
	}

	fn validate_vesting_schedules(
		vesting_schedules: &[VestingSchedule<MomentOf<T>>],
		end_time: MomentOf<T>,
	) -> DispatchResult {
		ensure!(
			vesting_schedules.len() as u32 <= T::MaxVestingSchedules::get(),
			Error::<T>::InvalidVestingSchedules
		);

		let mut total_weight = Rate::zero();
		let mut last_release_time: Option<MomentOf<T>> = None;
		for schedule in vesting_schedules {
			ensure!(
				!schedule.weight.is_zero() && schedule.weight <= Rate::one(),
				Error::<T>::InvalidVestingSchedules
			);
			ensure!(schedule.release_time > end_time, Error::<T>::InvalidVestingSchedules);
			if let Some(previous) = last_release_time {
				ensure!(schedule.release_time > previous, Error::<T>::InvalidVestingSchedules);
			}
			last_release_time = Some(schedule.release_time);
			total_weight = total_weight
				.checked_add(&schedule.weight)
				.ok_or(Error::<T>::InvalidVestingSchedules)?;
		}
		if !vesting_schedules.is_empty() {
			ensure!(total_weight == Rate::one(), Error::<T>::InvalidVestingSchedules);
		}
		Ok(())
	}

	/// Collects the creation fee, locks the selling coin and persists the new
	/// auction. Returns the assigned id and the birth status.
	#[allow(clippy::too_many_arguments)]
	fn do_create_auction(
		auctioneer: &T::AccountId,
		start_price: Price,
		selling_currency_id: CurrencyId,
		selling_amount: Balance,
		paying_currency_id: CurrencyId,
		vesting_schedules: Vec<VestingSchedule<MomentOf<T>>>,
		start_time: MomentOf<T>,
		end_time: MomentOf<T>,
		batch_params: Option<(u32, Rate)>,
	) -> sp_std::result::Result<(AuctionId, AuctionStatus), DispatchError> {
		let now = T::Time::now();
		ensure!(end_time > now, Error::<T>::InvalidEndTime);

		let auction_id = LastAuctionId::<T>::try_mutate(|id| -> sp_std::result::Result<AuctionId, DispatchError> {
			*id = id.checked_add(1).ok_or(ArithmeticError::Overflow)?;
			Ok(*id)
		})?;

		T::Currency::transfer(
			T::GetNativeCurrencyId::get(),
			auctioneer,
			&T::TreasuryAccount::get(),
			T::AuctionCreationFee::get(),
		)?;
		T::Currency::transfer(
			selling_currency_id,
			auctioneer,
			&Self::selling_reserve_account(auction_id),
			selling_amount,
		)?;

		// An auction whose start time already passed begins its life started.
		let status = if start_time <= now {
			AuctionStatus::Started
		} else {
			AuctionStatus::StandBy
		};

		let base = BaseAuction {
			auctioneer: auctioneer.clone(),
			start_price,
			selling_currency_id,
			selling_amount,
			paying_currency_id,
			vesting_schedules,
			winning_price: Price::zero(),
			num_winning_bidders: 0,
			remaining_selling_amount: selling_amount,
			start_time,
			end_times: vec![end_time],
			status,
		};
		let auction = match batch_params {
			None => Auction::FixedPrice(base),
			Some((max_extended_round, extended_round_rate)) => Auction::Batch(BatchAuction {
				base,
				max_extended_round,
				extended_round_rate,
			}),
		};
		Auctions::<T>::insert(auction_id, auction);

		Ok((auction_id, status))
	}

	fn do_cancel_auction(who: &T::AccountId, auction_id: AuctionId) -> DispatchResult {
		Auctions::<T>::try_mutate(auction_id, |maybe_auction| -> DispatchResult {
			let auction = maybe_auction.as_mut().ok_or(Error::<T>::AuctionNotFound)?;
			ensure!(auction.base().auctioneer == *who, Error::<T>::InvalidRequest);
			ensure!(
				auction.status() == AuctionStatus::StandBy,
				Error::<T>::InvalidAuctionStatus
			);

			Self::release_selling_coin(auction_id, auction)?;

			let base = auction.base_mut();
			base.remaining_selling_amount = Zero::zero();
			base.status = AuctionStatus::Cancelled;
			Ok(())
		})
	}

	fn do_place_bid(
		bidder: &T::AccountId,
		auction_id: AuctionId,
		price: Price,
		currency_id: CurrencyId,
		amount: Balance,
	) -> sp_std::result::Result<(BidSequence, BidType, Balance), DispatchError> {
		let mut auction = Self::auctions(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
		ensure!(
			auction.status() == AuctionStatus::Started,
			Error::<T>::InvalidAuctionStatus
		);

		let selling_currency_id = auction.base().selling_currency_id;
		let paying_currency_id = auction.base().paying_currency_id;

		let bid_type = match auction.auction_type() {
			AuctionType::FixedPrice => {
				ensure!(currency_id == paying_currency_id, Error::<T>::InvalidRequest);
				BidType::FixedPrice
			}
			AuctionType::Batch => {
				if currency_id == paying_currency_id {
					BidType::BatchWorth
				} else if currency_id == selling_currency_id {
					BidType::BatchMany
				} else {
					return Err(Error::<T>::InvalidRequest.into());
				}
			}
		};

		let paying_amount = match bid_type {
			BidType::FixedPrice | BidType::BatchWorth => {
				fixed_mul_truncated(amount, price).ok_or(ArithmeticError::Overflow)?
			}
			BidType::BatchMany => amount,
		};
		ensure!(
			T::Currency::free_balance(paying_currency_id, bidder) >= paying_amount,
			Error::<T>::InsufficientFunds
		);

		// The bid must fit into the selling coin that is still up for sale.
		let selling_equivalent = fixed_div_truncated(paying_amount, price).ok_or(Error::<T>::InvalidRequest)?;
		ensure!(
			auction.base().remaining_selling_amount >= selling_equivalent,
			Error::<T>::InvalidRequest
		);

		if auction.auction_type() == AuctionType::FixedPrice {
			ensure!(price == auction.base().start_price, Error::<T>::InvalidStartPrice);
			let base = auction.base_mut();
			base.remaining_selling_amount = base
				.remaining_selling_amount
				.checked_sub(selling_equivalent)
				.ok_or(ArithmeticError::Underflow)?;
			Auctions::<T>::insert(auction_id, &auction);
		}

		let sequence = LastBidSequence::<T>::try_mutate(
			auction_id,
			|sequence| -> sp_std::result::Result<BidSequence, DispatchError> {
				*sequence = sequence.checked_add(1).ok_or(ArithmeticError::Overflow)?;
				Ok(*sequence)
			},
		)?;

		let bid = Bid {
			bidder: bidder.clone(),
			bid_type,
			price,
			currency_id,
			amount,
			height: frame_system::Pallet::<T>::block_number(),
			is_winner: false,
		};
		Bids::<T>::insert(auction_id, sequence, bid);
		BidIndexes::<T>::insert(bidder, (auction_id, sequence), ());

		T::Currency::transfer(
			paying_currency_id,
			bidder,
			&Self::paying_reserve_account(auction_id),
			paying_amount,
		)?;

		Ok((sequence, bid_type, paying_amount))
	}

	fn do_add_allowed_bidders(auction_id: AuctionId, bidders: Vec<AllowedBidder<T::AccountId>>) -> DispatchResult {
		ensure!(Auctions::<T>::contains_key(auction_id), Error::<T>::AuctionNotFound);
		ensure!(!bidders.is_empty(), Error::<T>::EmptyAllowedBidders);

		for (i, allowed_bidder) in bidders.iter().enumerate() {
			ensure!(
				!allowed_bidder.max_bid_amount.is_zero(),
				Error::<T>::InvalidMaxBidAmount
			);
			ensure!(
				!bidders[..i].iter().any(|other| other.bidder == allowed_bidder.bidder),
				Error::<T>::InvalidRequest
			);
		}

		for allowed_bidder in bidders {
			AllowedBidders::<T>::insert(auction_id, &allowed_bidder.bidder, allowed_bidder.max_bid_amount);
		}
		Ok(())
	}

	fn do_update_allowed_bidder(
		auction_id: AuctionId,
		bidder: &T::AccountId,
		max_bid_amount: Balance,
	) -> DispatchResult {
		ensure!(Auctions::<T>::contains_key(auction_id), Error::<T>::AuctionNotFound);
		ensure!(!max_bid_amount.is_zero(), Error::<T>::InvalidMaxBidAmount);
		ensure!(
			AllowedBidders::<T>::contains_key(auction_id, bidder),
			Error::<T>::BidderNotFound
		);
		AllowedBidders::<T>::insert(auction_id, bidder, max_bid_amount);
		Ok(())
	}

	/// One end-block step for one auction.
	fn process_auction(auction_id: AuctionId, now: MomentOf<T>) -> DispatchResult {
		let auction = match Self::auctions(auction_id) {
			Some(auction) => auction,
			None => return Ok(()),
		};
		match auction.status() {
			AuctionStatus::StandBy => Self::execute_stand_by(auction_id, auction, now),
			AuctionStatus::Started => Self::execute_started(auction_id, auction, now),
			AuctionStatus::Vesting => Self::execute_vesting(auction_id, auction, now),
			AuctionStatus::Finished | AuctionStatus::Cancelled => Ok(()),
		}
	}

	fn execute_stand_by(
		auction_id: AuctionId,
		mut auction: Auction<T::AccountId, MomentOf<T>>,
		now: MomentOf<T>,
	) -> DispatchResult {
		if auction.started_by(now) {
			auction.base_mut().status = AuctionStatus::Started;
			Auctions::<T>::insert(auction_id, auction);
		}
		Ok(())
	}

	fn execute_started(
		auction_id: AuctionId,
		mut auction: Auction<T::AccountId, MomentOf<T>>,
		now: MomentOf<T>,
	) -> DispatchResult {
		if !auction.ended_by(now) {
			return Ok(());
		}

		// Without a single bid there is nothing to allocate or vest: hand the
		// selling coin back and close out.
		if Self::last_bid_sequence(auction_id).is_zero() {
			Self::release_selling_coin(auction_id, &auction)?;
			auction.base_mut().status = AuctionStatus::Finished;
			Auctions::<T>::insert(auction_id, auction);
			return Ok(());
		}

		match auction.auction_type() {
			AuctionType::FixedPrice => {
				Self::distribute_selling_coin(auction_id, &auction)?;
				Self::apply_vesting_schedules(auction_id, auction)?;
			}
			AuctionType::Batch => {
				let result = Self::calculate_batch_result(auction_id, auction.base().remaining_selling_amount);
				Self::mark_winning_bids(auction_id, &result);
				{
					let base = auction.base_mut();
					base.winning_price = result.clearing_price;
					base.num_winning_bidders = result.winners.len() as u32;
				}

				if Self::should_extend_round(auction_id, &auction, result.winners.len() as u32) {
					WinningBidsLen::<T>::insert(auction_id, result.winners.len() as u32);
					let next_end_time = now.saturating_add(T::ExtendedPeriod::get());
					auction.base_mut().end_times.push(next_end_time);
					Auctions::<T>::insert(auction_id, auction);
				} else {
					Self::distribute_batch_selling_coin(auction_id, &auction, &result)?;
					Self::apply_vesting_schedules(auction_id, auction)?;
				}
			}
		}
		Ok(())
	}

	/// Release pass over the vesting queue of one auction, ascending release
	/// time. Releasing the last tranche finishes the auction.
	fn execute_vesting(
		auction_id: AuctionId,
		mut auction: Auction<T::AccountId, MomentOf<T>>,
		now: MomentOf<T>,
	) -> DispatchResult {
		let paying_currency_id = auction.base().paying_currency_id;
		let vesting_reserve = Self::vesting_reserve_account(auction_id);

		let mut entries = VestingQueues::<T>::get(auction_id);
		let len = entries.len();
		let mut finished = false;

		for (i, entry) in entries.iter_mut().enumerate() {
			if entry.released || entry.release_time > now {
				continue;
			}

			// The last tranche drains the whole remaining reserve so the
			// truncation residue of the earlier tranches is not stranded.
			let release_amount = if i == len.saturating_sub(1) {
				T::Currency::free_balance(paying_currency_id, &vesting_reserve)
			} else {
				entry.paying_amount
			};
			T::Currency::transfer(paying_currency_id, &vesting_reserve, &entry.auctioneer, release_amount)?;
			entry.released = true;

			if i == len.saturating_sub(1) {
				finished = true;
			}
		}

		VestingQueues::<T>::insert(auction_id, entries);
		if finished {
			auction.base_mut().status = AuctionStatus::Finished;
			Auctions::<T>::insert(auction_id, auction);
		}
		Ok(())
	}

	/// Transfer the whole selling reserve balance back to the auctioneer.
	fn release_selling_coin(auction_id: AuctionId, auction: &Auction<T::AccountId, MomentOf<T>>) -> DispatchResult {
		let base = auction.base();
		let selling_reserve = Self::selling_reserve_account(auction_id);
		let balance = T::Currency::free_balance(base.selling_currency_id, &selling_reserve);
		T::Currency::transfer(base.selling_currency_id, &selling_reserve, &base.auctioneer, balance)
	}

	/// Fixed price allocation: every bid exchanges its paying coin at its bid
	/// price, the unsold residual goes back to the auctioneer. Runs inside
	/// the per-auction end-block transaction, so the payout is all-or-nothing.
	fn distribute_selling_coin(auction_id: AuctionId, auction: &Auction<T::AccountId, MomentOf<T>>) -> DispatchResult {
		let base = auction.base();
		let selling_reserve = Self::selling_reserve_account(auction_id);

		for (sequence, bid) in Self::bids_of_auction(auction_id) {
			let exchanged = fixed_div_truncated(bid.amount, bid.price).ok_or(Error::<T>::InvalidRequest)?;
			T::Currency::transfer(base.selling_currency_id, &selling_reserve, &bid.bidder, exchanged)?;
			Bids::<T>::mutate(auction_id, sequence, |maybe_bid| {
				if let Some(b) = maybe_bid {
					b.is_winner = true;
				}
			});
		}

		let residual = T::Currency::free_balance(base.selling_currency_id, &selling_reserve);
		T::Currency::transfer(base.selling_currency_id, &selling_reserve, &base.auctioneer, residual)
	}

	/// Batch allocation at the uniform clearing price: winners receive their
	/// exchanged selling coin, losing bids get their paying coin back, the
	/// unsold residual goes back to the auctioneer.
	fn distribute_batch_selling_coin(
		auction_id: AuctionId,
		auction: &Auction<T::AccountId, MomentOf<T>>,
		result: &BatchAuctionResult,
	) -> DispatchResult {
		let base = auction.base();
		let selling_reserve = Self::selling_reserve_account(auction_id);
		let paying_reserve = Self::paying_reserve_account(auction_id);

		for (_, bid) in Self::bids_of_auction(auction_id) {
			if bid.price >= result.clearing_price {
				let exchanged = match bid.bid_type {
					BidType::BatchMany => bid.amount,
					_ => fixed_div_truncated(bid.amount, result.clearing_price).ok_or(Error::<T>::InvalidRequest)?,
				};
				T::Currency::transfer(base.selling_currency_id, &selling_reserve, &bid.bidder, exchanged)?;
			} else {
				// Losing bids are refunded before the vesting engine locks
				// the paying pool.
				let refund = bid.paying_amount().ok_or(ArithmeticError::Overflow)?;
				T::Currency::transfer(base.paying_currency_id, &paying_reserve, &bid.bidder, refund)?;
			}
		}

		let residual = T::Currency::free_balance(base.selling_currency_id, &selling_reserve);
		T::Currency::transfer(base.selling_currency_id, &selling_reserve, &base.auctioneer, residual)
	}

	/// Uniform clearing price over all bids of a batch auction.
	///
	/// Candidates are the distinct bid prices in descending order. At each
	/// candidate the accumulated selling amount of the bids at or above it is
	/// computed; the clearing price is the last candidate whose demand does
	/// not exceed `remaining_amount`, or the first candidate if every one
	/// over-subscribes. The marginal bid is never partially filled.
	pub fn calculate_batch_result(auction_id: AuctionId, remaining_amount: Balance) -> BatchAuctionResult {
		let mut bids: Vec<(BidSequence, Bid<T::AccountId, BlockNumberFor<T>>)> =
			Bids::<T>::iter_prefix(auction_id).collect();
		// Total order: price descending, sequence ascending.
		bids.sort_by(|(sequence_a, bid_a), (sequence_b, bid_b)| {
			match bid_b.price.cmp(&bid_a.price) {
				Ordering::Equal => sequence_a.cmp(sequence_b),
				ordering => ordering,
			}
		});

		if bids.is_empty() {
			return BatchAuctionResult {
				clearing_price: Price::zero(),
				sold_amount: Zero::zero(),
				winners: vec![],
			};
		}

		let accumulate_at = |candidate: Price| -> Balance {
			bids.iter()
				.filter(|(_, bid)| bid.price >= candidate)
				.map(|(_, bid)| match bid.bid_type {
					BidType::BatchMany => bid.amount,
					_ => fixed_div_truncated(bid.amount, candidate).unwrap_or(Balance::MAX),
				})
				.fold(Balance::zero(), |acc, exchanged| acc.saturating_add(exchanged))
		};

		let mut cleared: Option<(Price, Balance)> = None;
		let mut previous_candidate: Option<Price> = None;
		for (_, bid) in bids.iter() {
			if previous_candidate == Some(bid.price) {
				continue;
			}
			previous_candidate = Some(bid.price);

			let accumulated = accumulate_at(bid.price);
			if accumulated > remaining_amount {
				break;
			}
			cleared = Some((bid.price, accumulated));
		}

		let (clearing_price, sold_amount) = cleared.unwrap_or_else(|| {
			// Even the highest price over-subscribes: clear there anyway, the
			// marginal bids stay unfilled.
			let first = bids[0].1.price;
			(first, accumulate_at(first))
		});

		let winners = bids
			.iter()
			.filter(|(_, bid)| bid.price >= clearing_price)
			.map(|(sequence, _)| *sequence)
			.collect();

		BatchAuctionResult {
			clearing_price,
			sold_amount,
			winners,
		}
	}

	/// Sync the winner flag of every bid of the auction with the clearing
	/// result. Flags from a previous extended round are overwritten.
	fn mark_winning_bids(auction_id: AuctionId, result: &BatchAuctionResult) {
		let winner_set: BTreeSet<BidSequence> = result.winners.iter().copied().collect();
		let sequences: Vec<BidSequence> = Bids::<T>::iter_prefix(auction_id).map(|(sequence, _)| sequence).collect();
		for sequence in sequences {
			Bids::<T>::mutate(auction_id, sequence, |maybe_bid| {
				if let Some(bid) = maybe_bid {
					bid.is_winner = winner_set.contains(&sequence);
				}
			});
		}
	}

	/// Whether a batch auction gets another bidding round instead of being
	/// finalized: the winner count must still be moving by more than
	/// `extended_round_rate` relative to the previous round.
	fn should_extend_round(
		auction_id: AuctionId,
		auction: &Auction<T::AccountId, MomentOf<T>>,
		current_winners: u32,
	) -> bool {
		let (max_extended_round, extended_round_rate) = match auction.batch_params() {
			Some(params) => params,
			None => return false,
		};
		if max_extended_round == 0 || auction.extended_rounds() >= max_extended_round {
			return false;
		}

		let previous_winners = Self::winning_bids_len(auction_id);
		if previous_winners == 0 {
			// Nothing to compare against on the first clearing.
			return current_winners > 0;
		}

		let delta = current_winners.abs_diff(previous_winners);
		Ratio::checked_from_rational(delta, previous_winners).map_or(false, |ratio| ratio > extended_round_rate)
	}

	/// Move the paying pool into the vesting queue and set the next status.
	///
	/// Without vesting schedules the pool goes straight to the auctioneer and
	/// the auction finishes. Otherwise the pool moves to the vesting reserve
	/// and one queue entry per schedule is materialized with its truncated
	/// share of the pool.
	fn apply_vesting_schedules(auction_id: AuctionId, mut auction: Auction<T::AccountId, MomentOf<T>>) -> DispatchResult {
		let paying_currency_id = auction.base().paying_currency_id;
		let auctioneer = auction.base().auctioneer.clone();
		let paying_reserve = Self::paying_reserve_account(auction_id);
		let reserve_balance = T::Currency::free_balance(paying_currency_id, &paying_reserve);

		if auction.base().vesting_schedules.is_empty() {
			T::Currency::transfer(paying_currency_id, &paying_reserve, &auctioneer, reserve_balance)?;
			auction.base_mut().status = AuctionStatus::Finished;
		} else {
			let vesting_reserve = Self::vesting_reserve_account(auction_id);
			T::Currency::transfer(paying_currency_id, &paying_reserve, &vesting_reserve, reserve_balance)?;

			let mut entries = Vec::with_capacity(auction.base().vesting_schedules.len());
			for schedule in &auction.base().vesting_schedules {
				let paying_amount =
					fixed_mul_truncated(reserve_balance, schedule.weight).ok_or(ArithmeticError::Overflow)?;
				entries.push(VestingQueueEntry {
					release_time: schedule.release_time,
					auctioneer: auctioneer.clone(),
					paying_amount,
					released: false,
				});
			}
			VestingQueues::<T>::insert(auction_id, entries);
			auction.base_mut().status = AuctionStatus::Vesting;
		}

		Auctions::<T>::insert(auction_id, auction);
		Ok(())
	}
}

// Cross-entity audits. Not part of the transaction flow: wired to the
// try-runtime `try_state` hook and callable from tests.
impl<T: Config> Pallet<T> {
	pub fn do_try_state() -> Result<(), &'static str> {
		Self::selling_pool_invariant()?;
		Self::paying_pool_invariant()?;
		Self::vesting_pool_invariant()?;
		Self::auction_status_invariant()?;
		Ok(())
	}

	/// The selling reserve of every started auction must hold at least the
	/// locked selling coin. Only the selling denomination counts.
	pub fn selling_pool_invariant() -> Result<(), &'static str> {
		for (auction_id, auction) in Self::auction_entries() {
			if auction.status() != AuctionStatus::Started {
				continue;
			}
			let base = auction.base();
			let reserve = T::Currency::free_balance(
				base.selling_currency_id,
				&Self::selling_reserve_account(auction_id),
			);
			if reserve < base.selling_amount {
				return Err("selling pool reserve is below the locked selling coin amount");
			}
		}
		Ok(())
	}

	/// The paying reserve of every started auction must hold at least the
	/// paying equivalent of all recorded bids.
	pub fn paying_pool_invariant() -> Result<(), &'static str> {
		for (auction_id, auction) in Self::auction_entries() {
			if auction.status() != AuctionStatus::Started {
				continue;
			}
			let base = auction.base();
			let mut total_bid_amount: Balance = Zero::zero();
			for (_, bid) in Bids::<T>::iter_prefix(auction_id) {
				let paying_amount = bid.paying_amount().ok_or("bid paying amount overflows")?;
				total_bid_amount = total_bid_amount.saturating_add(paying_amount);
			}
			let reserve = T::Currency::free_balance(
				base.paying_currency_id,
				&Self::paying_reserve_account(auction_id),
			);
			if reserve < total_bid_amount {
				return Err("paying pool reserve is below the total bid amount");
			}
		}
		Ok(())
	}

	/// The vesting reserve of every vesting auction must hold at least the
	/// sum of the unreleased tranches.
	pub fn vesting_pool_invariant() -> Result<(), &'static str> {
		for (auction_id, auction) in Self::auction_entries() {
			if auction.status() != AuctionStatus::Vesting {
				continue;
			}
			let base = auction.base();
			let unreleased: Balance = VestingQueues::<T>::get(auction_id)
				.iter()
				.filter(|entry| !entry.released)
				.fold(Balance::zero(), |acc, entry| acc.saturating_add(entry.paying_amount));
			let reserve = T::Currency::free_balance(
				base.paying_currency_id,
				&Self::vesting_reserve_account(auction_id),
			);
			if reserve < unreleased {
				return Err("vesting pool reserve is below the unreleased paying amount");
			}
		}
		Ok(())
	}

	/// Per-status shape checks and bid sequence contiguity.
	pub fn auction_status_invariant() -> Result<(), &'static str> {
		let now = T::Time::now();
		for (auction_id, auction) in Self::auction_entries() {
			match auction.status() {
				AuctionStatus::StandBy => {
					if auction.started_by(now) {
						return Err("stand-by auction is past its start time");
					}
				}
				AuctionStatus::Started => {
					if !auction.started_by(now) {
						return Err("started auction is before its start time");
					}
				}
				AuctionStatus::Vesting => {
					let queue_len = VestingQueues::<T>::get(auction_id).len();
					if queue_len != auction.base().vesting_schedules.len() {
						return Err("vesting queue length differs from the vesting schedules");
					}
				}
				AuctionStatus::Finished => {
					if auction.auction_type() == AuctionType::FixedPrice && !auction.ended_by(now) {
						return Err("finished fixed price auction is before its end time");
					}
				}
				AuctionStatus::Cancelled => {
					if !auction.base().remaining_selling_amount.is_zero() {
						return Err("cancelled auction has remaining selling coin");
					}
				}
			}

			let last_sequence = Self::last_bid_sequence(auction_id);
			let recorded = Bids::<T>::iter_prefix(auction_id).count() as BidSequence;
			if recorded != last_sequence {
				return Err("bid count differs from the last bid sequence");
			}
			for sequence in 1..=last_sequence {
				if !Bids::<T>::contains_key(auction_id, sequence) {
					return Err("bid sequences are not contiguous");
				}
			}
		}
		Ok(())
	}

	/// Auctions by ascending id, skipping gaps defensively.
	fn auction_entries() -> Vec<(AuctionId, Auction<T::AccountId, MomentOf<T>>)> {
		(1..=Self::last_auction_id())
			.filter_map(|auction_id| Self::auctions(auction_id).map(|auction| (auction_id, auction)))
			.collect()
	}
}

impl<T: Config> FundraisingManager<T::AccountId> for Pallet<T> {
	type AuctionId = AuctionId;
	type Balance = Balance;

	fn add_allowed_bidders(auction_id: AuctionId, bidders: Vec<(T::AccountId, Balance)>) -> DispatchResult {
		Self::do_add_allowed_bidders(
			auction_id,
			bidders
				.into_iter()
				.map(|(bidder, max_bid_amount)| AllowedBidder { bidder, max_bid_amount })
				.collect(),
		)
	}

	fn update_allowed_bidder(auction_id: AuctionId, bidder: T::AccountId, max_bid_amount: Balance) -> DispatchResult {
		Self::do_update_allowed_bidder(auction_id, &bidder, max_bid_amount)
	}
}
