//! Guild member search for manual resolution

use clan_core::matching::{search_candidates, RESOLVE_WINDOW};
use clan_core::{AuditAction, AuditEntry, DomainError, Snowflake};
use serde_json::json;
use tracing::{instrument, warn};

use crate::dto::{candidate_sublabel, CandidateListResponse, CandidateResponse, GuildMemberSearchQuery};

use super::context::ServiceContext;
use super::error::ServiceResult;

const DEFAULT_SEARCH_LIMIT: usize = 20;

pub struct DirectoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DirectoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ranked guild members matching `q`, each with a resolve token.
    ///
    /// Platform ids never leave the server in plain form here; the token is
    /// what the client sends back to the resolve endpoint.
    #[instrument(skip(self, query), fields(q = %query.q))]
    pub async fn search(
        &self,
        actor_id: Snowflake,
        query: GuildMemberSearchQuery,
    ) -> ServiceResult<CandidateListResponse> {
        let q = query.q.trim();
        if q.is_empty() {
            return Ok(CandidateListResponse {
                candidates: Vec::new(),
            });
        }
        let limit = query
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, RESOLVE_WINDOW);

        let snapshot = self.ctx.directory().list_all_members().await;
        if let Some(error) = &snapshot.error {
            if snapshot.members.is_empty() {
                return Err(DomainError::ExternalService(error.clone()).into());
            }
            warn!(%error, "Searching a partial directory");
        }

        let candidates = search_candidates(&snapshot.members, q, limit)
            .into_iter()
            .map(|candidate| {
                Ok(CandidateResponse {
                    resolve_token: self
                        .ctx
                        .jwt_service()
                        .issue_resolve_token(candidate.platform_id)?,
                    sublabel: candidate_sublabel(&candidate),
                    label: candidate.display_name,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::GuildMemberSearch).details(json!({
                    "query": q,
                    "result_count": candidates.len(),
                })),
            )
            .await;

        Ok(CandidateListResponse { candidates })
    }
}
