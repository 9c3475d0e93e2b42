use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::minutes::handler::upload_video,
    ),
    components(
        schemas(
            crate::modules::minutes::dto::UploadForm,
        )
    ),
    tags(
        (name = "Minutes", description = "Meeting video upload and minutes pipeline")
    )
)]
pub struct ApiDoc;
