use denticore::api_interface::{ClassesResponse, PredictionResponse};
use denticore::workflow::{
    annotated_image_url, media_type_for, present, ChartSlot, ProbabilityChartModel, ResultPanel,
    Section, SelectedImage, SubmissionRequest, SubmissionWorkflow,
};
use denticore::{RenderOutcome, RenderSurface, WorkflowError};
use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, image, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Task, Theme,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Dental Screening Visualizer".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn api_base() -> String {
    "http://127.0.0.1:5000".into()
}

struct Visualizer {
    form: SubmissionForm,
    selected: Option<SelectedImage>,
    preview: Option<image::Handle>,
    panel: ResultPanel,
    chart: ChartSlot,
    section: Section,
    workflow: SubmissionWorkflow,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    FormFieldChanged(FormField, String),
    LoadImage,
    ImageLoaded(Result<SelectedImage, String>),
    ClearImage,
    Submit,
    PredictionFinished(Result<PredictionResponse, String>),
    AnnotatedFetched(Result<Vec<u8>, String>),
    SectionSelected(String),
    ClassesProbed(Result<ClassesResponse, String>),
}

#[derive(Debug, Clone, Copy)]
enum FormField {
    ImagePath,
    Confidence,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                form: SubmissionForm::default(),
                selected: None,
                preview: None,
                panel: ResultPanel::new(),
                chart: ChartSlot::new(),
                section: Section::default(),
                workflow: SubmissionWorkflow::new(),
                status: "Probing prediction endpoint...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_classes(), Message::ClassesProbed),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::FormFieldChanged(field, value) => {
                state.form.update_field(field, value);
                Task::none()
            }
            Message::LoadImage => Task::perform(
                load_selected_image(state.form.image_path.clone()),
                Message::ImageLoaded,
            ),
            Message::ImageLoaded(Ok(selected)) => {
                state.preview = Some(image::Handle::from_bytes(selected.bytes.clone()));
                state.push_history(format!("Image selected: {}", selected.file_name));
                state.selected = Some(selected);
                Task::none()
            }
            // refused selections change nothing visible
            Message::ImageLoaded(Err(_)) => Task::none(),
            Message::ClearImage => {
                state.selected = None;
                state.preview = None;
                state.form.image_path.clear();
                state.push_history("Preview cleared".into());
                Task::none()
            }
            Message::Submit => {
                match state
                    .workflow
                    .prepare(state.selected.as_ref(), &state.form.confidence)
                {
                    Ok(request) => {
                        state.show_pending();
                        Task::perform(submit_prediction(request), Message::PredictionFinished)
                    }
                    Err(error) => {
                        state.show_failure(&error);
                        Task::none()
                    }
                }
            }
            Message::PredictionFinished(result) => {
                let settled = result
                    .map_err(|message| state.workflow.transport_failure(message))
                    .and_then(|response| state.workflow.render(&response));
                present(&settled, state);
                if let Ok(outcome) = settled {
                    if let Some(path) = outcome.annotated_path {
                        return Task::perform(
                            fetch_annotated_image(path),
                            Message::AnnotatedFetched,
                        );
                    }
                }
                Task::none()
            }
            Message::AnnotatedFetched(Ok(bytes)) => {
                state.preview = Some(image::Handle::from_bytes(bytes));
                state.push_history("Annotated image displayed".into());
                Task::none()
            }
            Message::AnnotatedFetched(Err(message)) => {
                state.status = format!("Annotated image unavailable: {}", message);
                Task::none()
            }
            Message::SectionSelected(name) => {
                match Section::from_name(&name) {
                    Ok(section) => state.section = section,
                    Err(error) => state.show_failure(&error),
                }
                Task::none()
            }
            Message::ClassesProbed(Ok(classes)) => {
                state.status = format!("Endpoint ready ({} classes)", classes.num_classes);
                state.push_history(format!("Classes: {}", classes.classes.join(", ")));
                Task::none()
            }
            Message::ClassesProbed(Err(message)) => {
                state.status = format!("Endpoint unreachable: {}", message);
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let sidebar = Section::ALL
            .iter()
            .fold(
                column![text("Dental Screening").size(22)].spacing(10),
                |col, section| {
                    col.push(
                        button(text(section.label()))
                            .on_press(Message::SectionSelected(section.name().to_string()))
                            .padding(8)
                            .width(Length::Fill),
                    )
                },
            )
            .push(text(&state.status).size(13))
            .padding(16)
            .width(Length::Fixed(210.0));

        let preview: Element<'_, Message> = match &state.preview {
            Some(handle) => Container::new(image(handle.clone()).width(Length::Fixed(380.0)))
                .padding(6)
                .into(),
            None => Container::new(text("No image selected").size(14))
                .padding(40)
                .into(),
        };

        let chart_model = state
            .chart
            .current()
            .map(|instance| instance.model().clone())
            .unwrap_or_default();

        let chart_canvas = Canvas::new(ProbabilityChart::new(chart_model.clone()))
            .width(Length::Fill)
            .height(Length::Fixed(240.0));

        let chart_entries = if chart_model.is_empty() {
            Column::new().push(text("No probabilities to chart").size(12))
        } else {
            chart_model.labels.iter().enumerate().fold(
                Column::new().spacing(4),
                |col, (index, label)| {
                    col.push(
                        text(format!(
                            "{}: cavity {:.2} | normal {:.2}",
                            label, chart_model.cavity[index], chart_model.normal[index]
                        ))
                        .size(12),
                    )
                },
            )
        };

        let detect_column = column![
            text("Detect").size(26),
            preview,
            text_input("Image path", &state.form.image_path)
                .on_input(|value| Message::FormFieldChanged(FormField::ImagePath, value))
                .padding(6),
            row![
                button("Load image").on_press(Message::LoadImage).padding(8),
                button("Remove").on_press(Message::ClearImage).padding(8),
            ]
            .spacing(10),
            text_input("Confidence threshold", &state.form.confidence)
                .on_input(|value| Message::FormFieldChanged(FormField::Confidence, value))
                .padding(6),
            button("Predict").on_press(Message::Submit).padding(10),
            text(format!("Result: {}", state.panel.result_text())).size(16),
            text(format!("Inference time: {}", state.panel.inference_text())).size(14),
            text("Prediction probabilities (red = cavity, green = normal)").size(16),
            chart_canvas,
            Container::new(chart_entries).padding(6),
        ]
        .spacing(10);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(13))
                })
        };

        let activity_column = column![
            text("Activity").size(26),
            Container::new(scrollable(history_list).height(Length::Fixed(380.0))).padding(6),
        ]
        .spacing(10);

        let (submissions, failures) = state.workflow.metrics().snapshot();
        let about_column = column![
            text("About").size(26),
            text("Uploads a dental scan to the prediction endpoint and renders the returned findings.")
                .size(14),
            text("Classes: cavity (red), normal (green)").size(14),
            text(format!("Endpoint: {}", api_base())).size(14),
            text(format!(
                "This session: {} submissions, {} failures",
                submissions, failures
            ))
            .size(14),
        ]
        .spacing(10);

        let content: Element<'_, Message> = match state.section {
            Section::Detect => detect_column.into(),
            Section::Activity => activity_column.into(),
            Section::About => about_column.into(),
        };

        let layout = row![sidebar, scrollable(content)]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

impl RenderSurface for Visualizer {
    fn show_pending(&mut self) {
        self.panel.set_pending();
        self.status = "Processing...".into();
    }

    fn show_failure(&mut self, error: &WorkflowError) {
        match error {
            WorkflowError::NoImageSelected | WorkflowError::UnknownSection(_) => {}
            _ => self.panel.reset_failed(),
        }
        self.status = match error {
            WorkflowError::Endpoint(message) => format!("Error: {}", message),
            WorkflowError::Transport(message) => {
                format!("An error occurred while predicting: {}", message)
            }
            other => other.to_string(),
        };
        let entry = self.status.clone();
        self.push_history(entry);
    }

    fn show_outcome(&mut self, outcome: &RenderOutcome) {
        self.panel
            .set_rendered(&outcome.summary, &outcome.inference_text);
        self.chart.install(outcome.chart.clone());
        self.status = outcome.summary.clone();
        self.push_history(format!(
            "{} in {}",
            outcome.summary, outcome.inference_text
        ));
    }
}

async fn load_selected_image(path: String) -> Result<SelectedImage, String> {
    if media_type_for(&path).is_none() {
        return Err(format!("not an image: {}", path));
    }
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| err.to_string())?;
    SelectedImage::from_path_bytes(&path, bytes).map_err(|err| err.to_string())
}

async fn fetch_classes() -> Result<ClassesResponse, String> {
    let response = reqwest::get(format!("{}/api/classes", api_base()))
        .await
        .map_err(|err| err.to_string())?;
    response
        .json::<ClassesResponse>()
        .await
        .map_err(|err| err.to_string())
}

async fn submit_prediction(request: SubmissionRequest) -> Result<PredictionResponse, String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|err| err.to_string())?;

    let part = reqwest::multipart::Part::bytes(request.image.bytes)
        .file_name(request.image.file_name)
        .mime_str(&request.image.media_type)
        .map_err(|err| err.to_string())?;
    let form = reqwest::multipart::Form::new()
        .part("image", part)
        .text("confidence", request.confidence);

    let response = client
        .post(format!("{}/api/predict", api_base()))
        .multipart(form)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP error! status: {}", response.status()));
    }
    response
        .json::<PredictionResponse>()
        .await
        .map_err(|err| err.to_string())
}

async fn fetch_annotated_image(saved_image_path: String) -> Result<Vec<u8>, String> {
    let token = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let url = annotated_image_url(&api_base(), &saved_image_path, token);

    let response = reqwest::get(url).await.map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP error! status: {}", response.status()));
    }
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|err| err.to_string())
}

#[derive(Debug, Clone)]
struct SubmissionForm {
    image_path: String,
    confidence: String,
}

impl SubmissionForm {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            confidence: "0.25".into(),
        }
    }

    fn update_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::ImagePath => self.image_path = value,
            FormField::Confidence => self.confidence = value,
        }
    }
}

#[derive(Clone)]
struct ProbabilityChart {
    model: ProbabilityChartModel,
}

impl ProbabilityChart {
    fn new(model: ProbabilityChartModel) -> Self {
        Self { model }
    }
}

impl canvas::Program<Message> for ProbabilityChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let left = 28.0;
        let bottom = bounds.height - 18.0;
        let plot_width = (bounds.width - left - 10.0).max(1.0);
        let plot_height = (bottom - 10.0).max(1.0);

        // gridlines at 0.25 steps of the 0..1 probability axis
        for step in 0..=4 {
            let y = bottom - plot_height * (step as f32 / 4.0);
            let line = Path::new(|builder| {
                builder.move_to(Point::new(left, y));
                builder.line_to(Point::new(left + plot_width, y));
            });
            frame.stroke(
                &line,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb(0.25, 0.25, 0.3)),
            );
        }

        let groups = self.model.bar_groups();
        if groups == 0 {
            return vec![frame.into_geometry()];
        }

        let group_width = plot_width / groups as f32;
        let bar_width = (group_width * 0.35).min(40.0);

        for index in 0..groups {
            let center = left + group_width * (index as f32 + 0.5);
            let cavity = self.model.cavity[index].clamp(0.0, 1.0);
            let normal = self.model.normal[index].clamp(0.0, 1.0);

            let cavity_height = plot_height * cavity;
            frame.fill_rectangle(
                Point::new(center - bar_width, bottom - cavity_height),
                Size::new(bar_width, cavity_height),
                Color::from_rgb(0.9, 0.1, 0.1),
            );

            let normal_height = plot_height * normal;
            frame.fill_rectangle(
                Point::new(center, bottom - normal_height),
                Size::new(bar_width, normal_height),
                Color::from_rgb(0.1, 0.8, 0.2),
            );
        }

        vec![frame.into_geometry()]
    }
}
