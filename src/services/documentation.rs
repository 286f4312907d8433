use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Links Cup Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::tournament_stream,
        crate::routes::tournaments::create_tournament,
        crate::routes::tournaments::get_tournament,
        crate::routes::tournaments::update_tournament,
        crate::routes::tournaments::join_tournament,
        crate::routes::scores::get_scores,
        crate::routes::scores::put_scores,
        crate::routes::scores::record_hole,
        crate::routes::scores::get_handicaps,
        crate::routes::scores::get_standings,
        crate::routes::catalog::list_formats,
        crate::routes::catalog::list_courses,
        crate::routes::catalog::compute_handicap,
        crate::routes::course_search::search,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::tournament::CreateTournamentRequest,
            crate::dto::tournament::UpdateTournamentRequest,
            crate::dto::tournament::MatchInput,
            crate::dto::tournament::JoinTournamentRequest,
            crate::dto::tournament::JoinTournamentResponse,
            crate::dto::tournament::TournamentView,
            crate::dto::scores::RecordHoleRequest,
            crate::dto::scores::MatchHandicapsResponse,
            crate::dto::scores::StandingsResponse,
            crate::dto::catalog::FormatView,
            crate::dto::catalog::CourseHandicapResponse,
            crate::dto::course::CourseSearchRequest,
            crate::dto::course::CourseSearchResponse,
            crate::state::access::Role,
            crate::state::course::Course,
            crate::state::tournament::ScoreCard,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "tournaments", description = "Tournament setup and access"),
        (name = "scores", description = "Score entry, handicaps and standings"),
        (name = "catalog", description = "Formats, preset courses and handicap calculator"),
        (name = "courses", description = "Course data lookup"),
    )
)]
pub struct ApiDoc;
