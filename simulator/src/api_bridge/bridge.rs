use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;

use bytes::BufMut;
use denticore::api_interface::ClassesResponse;
use futures_util::TryStreamExt;
use serde_json::json;
use tokio::runtime::Builder;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

use crate::api_bridge::model::ServiceSnapshot;
use crate::workflow::runner::PredictRunner;

const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

fn bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

struct UploadedImage {
    file_name: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    image: Option<UploadedImage>,
    confidence: Option<String>,
}

async fn part_bytes(part: Part) -> Result<Vec<u8>, String> {
    part.stream()
        .try_fold(Vec::new(), |mut data, chunk| {
            data.put(chunk);
            async move { Ok(data) }
        })
        .await
        .map_err(|err| err.to_string())
}

async fn read_form(form: FormData) -> Result<UploadForm, String> {
    let parts: Vec<Part> = form.try_collect().await.map_err(|err| err.to_string())?;

    let mut upload = UploadForm::default();
    for part in parts {
        let name = part.name().to_string();
        match name.as_str() {
            "image" => {
                let file_name = part.filename().unwrap_or_default().to_string();
                let bytes = part_bytes(part).await?;
                upload.image = Some(UploadedImage { file_name, bytes });
            }
            "confidence" => {
                let bytes = part_bytes(part).await?;
                upload.confidence = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            _ => {}
        }
    }
    Ok(upload)
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

async fn handle_predict(
    form: FormData,
    state: Arc<RwLock<ServiceSnapshot>>,
    runner: Arc<PredictRunner>,
) -> Result<impl Reply, Rejection> {
    let upload = match read_form(form).await {
        Ok(upload) => upload,
        Err(message) => return Ok(error_reply(StatusCode::BAD_REQUEST, &message)),
    };
    let Some(image) = upload.image else {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "No image provided"));
    };
    if image.file_name.is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "No image selected"));
    }

    let confidence = match upload.confidence.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<f32>() {
            Ok(value) => Some(value),
            Err(_) => {
                return Ok(error_reply(
                    StatusCode::BAD_REQUEST,
                    "invalid confidence value",
                ))
            }
        },
    };

    match runner.execute(&image.file_name, &image.bytes, confidence) {
        Ok(response) => {
            if let Ok(mut guard) = state.write() {
                guard.predictions_served += 1;
                guard.last_response = Some(response.clone());
            }
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            log::error!("predict failed: {:#}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &err.to_string(),
            ))
        }
    }
}

/// The fixed endpoint contract: prediction, annotated-image download,
/// and the class listing.
pub fn routes(
    state: Arc<RwLock<ServiceSnapshot>>,
    runner: Arc<PredictRunner>,
    output_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let runner_filter = warp::any().map(move || runner.clone());

    let predict_route = warp::path!("api" / "predict")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(state_filter)
        .and(runner_filter)
        .and_then(handle_predict);

    let classes_route = warp::path!("api" / "classes")
        .and(warp::get())
        .map(|| warp::reply::json(&ClassesResponse::canonical()));

    let download_route = warp::path("download")
        .and(warp::path("image"))
        .and(warp::fs::dir(output_dir));

    predict_route.or(classes_route).or(download_route)
}

/// Bridge that hosts the prediction HTTP endpoint backed by the
/// synthetic runner.
pub struct ApiBridge {
    state: Arc<RwLock<ServiceSnapshot>>,
}

impl ApiBridge {
    pub fn new(runner: Arc<PredictRunner>, port: u16) -> Self {
        let state = Arc::new(RwLock::new(ServiceSnapshot::default()));
        let output_dir = runner.config().output_dir.clone();
        let api = routes(state.clone(), runner, output_dir);

        thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(api).run(bind_address(port)).await;
            });
        });

        Self { state }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[API] {}", message);
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template::{encode_png, sample_image};
    use crate::workflow::config::ServiceConfig;
    use denticore::api_interface::PredictionResponse;
    use std::path::Path;

    fn multipart_body(boundary: &str, confidence: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(confidence) = confidence {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"confidence\"\r\n\r\n{}\r\n",
                    boundary, confidence
                )
                .as_bytes(),
            );
        }
        if let Some(image) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"scan.png\"\r\nContent-Type: image/png\r\n\r\n",
                    boundary
                )
                .as_bytes(),
            );
            body.extend_from_slice(image);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }

    fn test_api(
        output_dir: &Path,
    ) -> (
        Arc<RwLock<ServiceSnapshot>>,
        impl Filter<Extract = impl Reply, Error = Rejection> + Clone,
    ) {
        let config = ServiceConfig::from_args(0.25, 4, 7, output_dir.to_path_buf());
        let runner = Arc::new(PredictRunner::new(config));
        let state = Arc::new(RwLock::new(ServiceSnapshot::default()));
        let api = routes(state.clone(), runner, output_dir.to_path_buf());
        (state, api)
    }

    #[tokio::test]
    async fn predict_route_runs_the_synthetic_pass() {
        let dir = tempfile::tempdir().unwrap();
        let (state, api) = test_api(dir.path());
        let png = encode_png(&sample_image(96, 64)).unwrap();
        let body = multipart_body("boundary42", Some("0.3"), Some(&png));

        let reply = warp::test::request()
            .method("POST")
            .path("/api/predict")
            .header(
                "content-type",
                "multipart/form-data; boundary=boundary42",
            )
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(reply.status(), StatusCode::OK);
        let response: PredictionResponse = serde_json::from_slice(reply.body()).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.num_detections, response.detections.len());
        assert_eq!(response.confidence_threshold, Some(0.3));
        assert_eq!(state.read().unwrap().predictions_served, 1);

        let saved = response.saved_image_path.unwrap();
        let download = warp::test::request()
            .method("GET")
            .path(&format!("/download/image/{}?t=1700", saved))
            .reply(&api)
            .await;
        assert_eq!(download.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predict_without_an_image_part_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (state, api) = test_api(dir.path());
        let body = multipart_body("boundary42", Some("0.3"), None);

        let reply = warp::test::request()
            .method("POST")
            .path("/api/predict")
            .header(
                "content-type",
                "multipart/form-data; boundary=boundary42",
            )
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(body["error"], "No image provided");
        assert_eq!(state.read().unwrap().predictions_served, 0);
    }

    #[tokio::test]
    async fn invalid_confidence_is_rejected_before_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let (_, api) = test_api(dir.path());
        let png = encode_png(&sample_image(48, 32)).unwrap();
        let body = multipart_body("boundary42", Some("lots"), Some(&png));

        let reply = warp::test::request()
            .method("POST")
            .path("/api/predict")
            .header(
                "content-type",
                "multipart/form-data; boundary=boundary42",
            )
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(body["error"], "invalid confidence value");
    }

    #[tokio::test]
    async fn classes_route_serves_the_trained_set() {
        let dir = tempfile::tempdir().unwrap();
        let (_, api) = test_api(dir.path());

        let reply = warp::test::request()
            .method("GET")
            .path("/api/classes")
            .reply(&api)
            .await;

        assert_eq!(reply.status(), StatusCode::OK);
        let classes: ClassesResponse = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(classes, ClassesResponse::canonical());
    }
}
