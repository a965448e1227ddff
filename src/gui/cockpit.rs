use std::{
    cell::{Cell, RefCell},
    io::stdout,
    rc::Rc,
    time::Duration,
};

use crate::config::SimConfig;
use crate::frame_loop::FrameScheduler;
use crate::gauge::RiskGauge;
use crate::gui::{dashboard, error::CockpitGuiError, pacer::FramePacer};
use crate::renderer::{RoadRenderer, RoadView, SceneBuffer};
use crate::risk::{assess, RiskAssessment, SimulationInputs};

use crossterm::{
    event::{self, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

const COARSE_STEP: u8 = 10;

/// Which slider the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    #[allow(missing_docs)]
    Attention,
    #[allow(missing_docs)]
    Complexity,
}

/// What the run loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    #[allow(missing_docs)]
    Continue,
    #[allow(missing_docs)]
    Quit,
}

/// Everything the cockpit screen shows, and the road view while it is
/// on screen.
pub struct Cockpit {
    config: SimConfig,
    inputs: Rc<Cell<SimulationInputs>>,
    surface: Rc<RefCell<SceneBuffer>>,
    assessment: RiskAssessment,
    gauge: RiskGauge,
    selected: Slider,
    view: Option<RoadView>,
}

impl Cockpit {
    /// A cockpit with the sliders at their configured defaults.
    pub fn new(config: SimConfig) -> Self {
        let inputs = config.defaults;
        let assessment = assess(inputs, &config.thresholds);
        Self {
            inputs: Rc::new(Cell::new(inputs)),
            surface: Rc::new(RefCell::new(SceneBuffer::new())),
            gauge: RiskGauge::new(assessment.score),
            assessment,
            selected: Slider::Attention,
            view: None,
            config,
        }
    }

    /// Put the road on screen, driven by `scheduler`.
    pub fn activate(&mut self, scheduler: &FrameScheduler) {
        let renderer = RoadRenderer::new(self.config.road, self.config.seed);
        self.view = Some(RoadView::activate(
            scheduler,
            renderer,
            self.inputs.clone(),
            self.surface.clone(),
        ));
    }

    /// Take the road off screen. Its frame registration goes with it.
    pub fn deactivate(&mut self) {
        self.view = None;
        self.surface.borrow_mut().set_extent(None);
    }

    /// Whether the road view is live.
    pub fn is_active(&self) -> bool {
        self.view.is_some()
    }

    /// Overwrite the inputs and recompute everything derived from them.
    pub fn set_inputs(&mut self, inputs: SimulationInputs) {
        self.inputs.set(inputs);
        let assessment = assess(inputs, &self.config.thresholds);
        if assessment.mode != self.assessment.mode {
            info!(
                "risk mode {} -> {} at {:.1}",
                self.assessment.mode, assessment.mode, assessment.score
            );
        }
        self.gauge.set_score(assessment.score);
        self.assessment = assessment;
    }

    /// React to one key press.
    pub fn handle_key(&mut self, code: KeyCode) -> Control {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                self.selected = match self.selected {
                    Slider::Attention => Slider::Complexity,
                    Slider::Complexity => Slider::Attention,
                };
            }
            KeyCode::Left => self.nudge(-1),
            KeyCode::Right => self.nudge(1),
            KeyCode::PageDown => self.nudge(-(COARSE_STEP as i16)),
            KeyCode::PageUp => self.nudge(COARSE_STEP as i16),
            KeyCode::Char('r') => self.set_inputs(self.config.defaults),
            _ => {}
        }
        Control::Continue
    }

    // Sliders saturate at their ends, like a range input.
    fn nudge(&mut self, by: i16) {
        let mut inputs = self.inputs.get();
        let value = match self.selected {
            Slider::Attention => &mut inputs.attention,
            Slider::Complexity => &mut inputs.complexity,
        };
        *value = (*value as i16 + by).clamp(0, 100) as u8;
        self.set_inputs(inputs);
    }

    /// Advance the parts of the dashboard the road view doesn't own.
    pub fn on_frame(&mut self, dt: Duration) {
        self.gauge.step(dt);
    }

    #[allow(missing_docs)]
    pub fn inputs(&self) -> SimulationInputs {
        self.inputs.get()
    }

    #[allow(missing_docs)]
    pub fn assessment(&self) -> RiskAssessment {
        self.assessment
    }

    #[allow(missing_docs)]
    pub fn gauge(&self) -> &RiskGauge {
        &self.gauge
    }

    #[allow(missing_docs)]
    pub fn selected(&self) -> Slider {
        self.selected
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn surface(&self) -> &Rc<RefCell<SceneBuffer>> {
        &self.surface
    }
}

/// Take over the terminal and run the cockpit until the user quits.
pub fn run_cockpit(config: SimConfig) -> Result<(), CockpitGuiError> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let res = run_loop(&mut terminal, config);

    // restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    config: SimConfig,
) -> Result<(), CockpitGuiError> {
    let mut pacer = FramePacer::new(config.fps);
    let mut scheduler = FrameScheduler::new();
    let mut cockpit = Cockpit::new(config);
    cockpit.activate(&scheduler);

    'frames: loop {
        let dt = pacer.begin();
        scheduler.tick(dt);
        cockpit.on_frame(dt);
        terminal.draw(|frame| dashboard::draw(frame, &cockpit))?;

        while event::poll(Duration::ZERO)? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && cockpit.handle_key(key.code) == Control::Quit
                {
                    break 'frames;
                }
            }
        }
        pacer.sleep_remaining();
    }

    cockpit.deactivate();
    info!(
        "cockpit closed after {} frames, {} frame callbacks",
        scheduler.frames(),
        scheduler.invocations()
    );
    Ok(())
}
