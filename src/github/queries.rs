//! GraphQL query documents for the three query shapes the exporter issues.
//!
//! Documents are fully substituted here; string arguments are emitted as JSON
//! string literals, which GraphQL accepts verbatim.

pub const PAGE_SIZE: u32 = 100;

/// Quote a value as a GraphQL string literal.
fn quote(s: &str) -> String {
  serde_json::Value::String(s.to_string()).to_string()
}

fn after_clause(cursor: &str) -> String {
  if cursor.trim().is_empty() {
    String::new()
  } else {
    format!(", after: {}", quote(cursor))
  }
}

#[derive(Debug, Clone)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  fn header(&self) -> String {
    format!("repository(owner: {}, name: {})", quote(&self.owner), quote(&self.name))
  }
}

/// Commit history of `branch`, newest first as returned by the API.
pub fn branch_history(repo: &RepoRef, branch: &str, cursor: &str) -> String {
  format!(
    r#"{{
  {repository} {{
    ref(qualifiedName: {branch}) {{
      target {{
        ... on Commit {{
          history(first: {PAGE_SIZE}{after}) {{
            pageInfo {{
              hasNextPage
              endCursor
            }}
            edges {{
              node {{
                oid
                abbreviatedOid
                message
                authoredDate
                additions
                deletions
                changedFiles
                associatedPullRequests {{
                  totalCount
                }}
              }}
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
    repository = repo.header(),
    branch = quote(branch),
    after = after_clause(cursor),
  )
}

/// Merged pull requests in creation order, with the first page of their commits.
pub fn merged_pull_requests(repo: &RepoRef, cursor: &str) -> String {
  format!(
    r#"{{
  {repository} {{
    pullRequests(first: {PAGE_SIZE}{after}, states: MERGED, orderBy: {{field: CREATED_AT, direction: ASC}}) {{
      pageInfo {{
        hasNextPage
        endCursor
      }}
      nodes {{
        number
        title
        mergedAt
        additions
        deletions
        changedFiles
        commits(first: {PAGE_SIZE}) {{
          totalCount
          pageInfo {{
            hasNextPage
            endCursor
          }}
          nodes {{
            commit {{
              oid
            }}
          }}
        }}
        closingIssuesReferences(first: {PAGE_SIZE}) {{
          nodes {{
            number
            title
          }}
        }}
      }}
    }}
  }}
}}"#,
    repository = repo.header(),
    after = after_clause(cursor),
  )
}

/// Remaining commits of one pull request, for sets larger than one page.
pub fn pull_request_commits(repo: &RepoRef, number: u64, cursor: &str) -> String {
  format!(
    r#"{{
  {repository} {{
    pullRequest(number: {number}) {{
      commits(first: {PAGE_SIZE}{after}) {{
        pageInfo {{
          hasNextPage
          endCursor
        }}
        nodes {{
          commit {{
            oid
          }}
        }}
      }}
    }}
  }}
}}"#,
    repository = repo.header(),
    after = after_clause(cursor),
  )
}
