//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    ApplicationListQuery, ClearQueueRequest, CreateRosterMemberRequest, GuildMemberSearchQuery,
    ImportRequest, ResolveMemberRequest, ReviewAction, ReviewApplicationRequest, RosterListQuery,
    SubmitApplicationRequest, UpdateRosterMemberRequest,
};

// Re-export commonly used response types
pub use responses::{
    ApplicationListResponse, ApplicationResponse, ApplicationSummary, BuildQueueResponse,
    BulkResolveResponse, CandidateListResponse, CandidateResponse, ClearQueueResponse,
    ConfirmQueueResponse, HealthChecks, HealthResponse, ImportResponse, MeResponse,
    ProcessQueueResponse, PromotionItemResponse, PromotionQueueResponse, QueueItemEnvelope,
    ReadinessResponse, ResolveDetail, ReviewResponse, RosterMemberEnvelope, RosterMemberResponse,
    RosterPageResponse,
};

// Re-export mappers and helper structs
pub use mappers::{candidate_sublabel, QueueItemWithMember, RosterView};
