// Open API path constants and well-known default values

/// The "public" namespace every config and service falls into when no
/// namespace is given.
pub const DEFAULT_NAMESPACE_ID: &str = "public";

/// The group used when no group is given.
pub const DEFAULT_GROUP_NAME: &str = "DEFAULT_GROUP";

/// The cluster used when no cluster is given.
pub const DEFAULT_CLUSTER_NAME: &str = "DEFAULT";

/// The first page of any paged listing (pages are 1-based).
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// The page size used when no page size is given.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// The largest page size the server accepts. Requests above this are
/// rejected client-side before any network call.
pub const MAX_PAGE_SIZE: u32 = 500;

/// The request parameter carrying the access token on authenticated calls.
pub const ACCESS_TOKEN_PARAM: &str = "accessToken";

pub mod v1_api_path {
    pub const AUTH_LOGIN: &str = "/v1/auth/users/login";

    // Config
    pub const CONFIG: &str = "/v1/cs/configs";
    pub const CONFIG_HISTORY: &str = "/v1/cs/history";
    pub const CONFIG_HISTORY_PREVIOUS: &str = "/v1/cs/history/previous";

    // Instance
    pub const INSTANCE: &str = "/v1/ns/instance";
    pub const INSTANCE_LIST: &str = "/v1/ns/instance/list";
    pub const INSTANCE_BEAT: &str = "/v1/ns/instance/beat";
    pub const INSTANCE_HEALTH: &str = "/v1/ns/health/instance";

    // Service
    pub const SERVICE: &str = "/v1/ns/service";
    pub const SERVICE_LIST: &str = "/v1/ns/service/list";

    // Namespace
    pub const NAMESPACES: &str = "/v1/console/namespaces";

    // Server
    pub const SERVER_STATE: &str = "/v1/console/server-state";
    pub const OPERATOR_METRICS: &str = "/v1/ns/operator/metrics";
    pub const OPERATOR_SERVERS: &str = "/v1/ns/operator/servers";
    pub const OPERATOR_SWITCHES: &str = "/v1/ns/operator/switches";

    // Raft
    pub const RAFT_LEADER: &str = "/v1/ns/raft/leader";
    pub const CORE_OPS_RAFT: &str = "/v1/core/ops/raft";
}

pub mod v2_api_path {
    // Authentication stayed on the v1 surface in the v2 Open API.
    pub const AUTH_LOGIN: &str = "/v1/auth/users/login";

    // Config
    pub const CONFIG: &str = "/v2/cs/config";
    pub const CONFIG_HISTORY: &str = "/v2/cs/history";
    pub const CONFIG_HISTORY_LIST: &str = "/v2/cs/history/list";
    pub const CONFIG_HISTORY_PREVIOUS: &str = "/v2/cs/history/previous";

    // Instance
    pub const INSTANCE: &str = "/v2/ns/instance";
    pub const INSTANCE_LIST: &str = "/v2/ns/instance/list";
    pub const INSTANCE_HEALTH: &str = "/v2/ns/health/instance";

    // Service
    pub const SERVICE: &str = "/v2/ns/service";
    pub const SERVICE_LIST: &str = "/v2/ns/service/list";

    // Namespace
    pub const NAMESPACE: &str = "/v2/console/namespace";
    pub const NAMESPACE_LIST: &str = "/v2/console/namespace/list";
}
