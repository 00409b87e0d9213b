// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Up/down trading contract calls.

use alloy::{
    primitives::{Bytes, U256},
    sol,
    sol_types::SolCall,
};

use super::client::ChainError;
use super::types::Direction;
use super::units::parse_units;

sol! {
    /// Trade argument. The contract ABI is not published; the `string`
    /// type for `poolId` is assumed and must match the deployed contract.
    struct TradeData {
        string poolId;
        bool upOrDown;
        uint256 bet;
    }

    interface ITrade {
        function makeTrade(TradeData tradeData) external;
    }
}

/// A single user trade, built per action and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOrder {
    pub pool_id: String,
    pub direction: Direction,
    /// Human-readable bet amount (e.g. "10")
    pub bet_amount: String,
}

impl TradeOrder {
    /// Calldata for `makeTrade((poolId, upOrDown, bet))` with the bet scaled
    /// to `decimals`. The pool id is passed through as configured.
    pub fn encode(&self, decimals: u8) -> Result<Bytes, ChainError> {
        let bet: U256 = parse_units(&self.bet_amount, decimals)?;
        let call = ITrade::makeTradeCall {
            tradeData: TradeData {
                poolId: self.pool_id.clone(),
                upOrDown: self.direction.is_up(),
                bet,
            },
        };
        Ok(call.abi_encode().into())
    }
}
