// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for the GitHub GraphQL retrieval pipeline (transport, queries, pagination, mapping, fetch)
// role: github/namespace
// outputs: Public submodules; RepoInspector is the entry point used by export
// invariants: All network access goes through the GraphqlTransport seam
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod fetch;
pub mod mappers;
pub mod paginate;
pub mod queries;
pub mod transport;
