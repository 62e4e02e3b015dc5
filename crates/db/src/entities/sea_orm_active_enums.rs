//! String-backed enums shared by the entities, with conversions to the core types.

use bap_core::auth::Role;
use bap_core::import::Channel;
use bap_core::workflow::FileStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "planner")]
    Planner,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "approved_for_print")]
    ApprovedForPrint,
    #[sea_orm(string_value = "signing")]
    Signing,
    #[sea_orm(string_value = "finalized")]
    Finalized,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MediaChannel {
    #[sea_orm(string_value = "TV")]
    #[serde(rename = "TV")]
    Tv,
    #[sea_orm(string_value = "OOH")]
    #[serde(rename = "OOH")]
    Ooh,
    #[sea_orm(string_value = "FM")]
    #[serde(rename = "FM")]
    Fm,
    #[sea_orm(string_value = "Digital")]
    Digital,
    #[sea_orm(string_value = "Print")]
    Print,
    #[sea_orm(string_value = "Event")]
    Event,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Planner => Self::Planner,
            UserRole::Manager => Self::Manager,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Planner => Self::Planner,
            Role::Manager => Self::Manager,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<BudgetStatus> for FileStatus {
    fn from(status: BudgetStatus) -> Self {
        match status {
            BudgetStatus::PendingApproval => Self::PendingApproval,
            BudgetStatus::ApprovedForPrint => Self::ApprovedForPrint,
            BudgetStatus::Signing => Self::Signing,
            BudgetStatus::Finalized => Self::Finalized,
            BudgetStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<FileStatus> for BudgetStatus {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::PendingApproval => Self::PendingApproval,
            FileStatus::ApprovedForPrint => Self::ApprovedForPrint,
            FileStatus::Signing => Self::Signing,
            FileStatus::Finalized => Self::Finalized,
            FileStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<MediaChannel> for Channel {
    fn from(channel: MediaChannel) -> Self {
        match channel {
            MediaChannel::Tv => Self::Tv,
            MediaChannel::Ooh => Self::Ooh,
            MediaChannel::Fm => Self::Fm,
            MediaChannel::Digital => Self::Digital,
            MediaChannel::Print => Self::Print,
            MediaChannel::Event => Self::Event,
            MediaChannel::Other => Self::Other,
        }
    }
}

impl From<Channel> for MediaChannel {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Tv => Self::Tv,
            Channel::Ooh => Self::Ooh,
            Channel::Fm => Self::Fm,
            Channel::Digital => Self::Digital,
            Channel::Print => Self::Print,
            Channel::Event => Self::Event,
            Channel::Other => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_core() {
        for status in FileStatus::ALL {
            assert_eq!(FileStatus::from(BudgetStatus::from(status)), status);
        }
    }

    #[test]
    fn test_stored_status_matches_core_name() {
        for status in FileStatus::ALL {
            assert_eq!(BudgetStatus::from(status).to_value(), status.as_str());
        }
    }

    #[test]
    fn test_channel_round_trips_through_core() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from(MediaChannel::from(channel)), channel);
            assert_eq!(MediaChannel::from(channel).to_value(), channel.as_str());
        }
    }
}
