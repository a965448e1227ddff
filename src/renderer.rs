//! The road renderer: owns a [RoadState], the seeded generator that bends
//! the road, and the springs that carry the car, and draws a [RoadScene]
//! onto a [Surface] once per frame.
//!
//! [RoadView] is the piece that plugs into a [FrameScheduler]. It holds the
//! frame registration, so the loop lives exactly as long as the view does.

use crate::frame_loop::{FrameHandle, FrameScheduler, FrameTick};
use crate::risk::SimulationInputs;
use crate::road::{RoadParams, RoadScene, RoadState, VehiclePose};
use crate::spring::Spring;

use log::{info, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Drawable area of a surface, in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    #[allow(missing_docs)]
    pub width: f64,
    #[allow(missing_docs)]
    pub height: f64,
}

/// Something a [RoadScene] can be drawn on.
pub trait Surface {
    /// The current drawable area, or `None` if there is nowhere to draw
    /// right now (not laid out yet, or already torn down).
    fn extent(&self) -> Option<Extent>;

    /// Draw a finished frame.
    fn present(&mut self, scene: RoadScene);
}

/// A [Surface] that keeps the most recent scene around for whoever paints
/// the screen. The extent is set by the layout code each time it knows how
/// big the road panel is.
#[derive(Debug, Default)]
pub struct SceneBuffer {
    extent: Option<Extent>,
    latest: Option<RoadScene>,
    presented: u64,
}

impl SceneBuffer {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the area available for drawing, `None` to mark it unavailable.
    pub fn set_extent(&mut self, extent: Option<Extent>) {
        self.extent = extent;
    }

    /// The last scene presented, if any.
    pub fn latest(&self) -> Option<&RoadScene> {
        self.latest.as_ref()
    }

    /// How many frames have been presented.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Surface for SceneBuffer {
    fn extent(&self) -> Option<Extent> {
        self.extent
    }

    fn present(&mut self, scene: RoadScene) {
        self.latest = Some(scene);
        self.presented += 1;
    }
}

/// Owns all per-view road state.
#[derive(Debug)]
pub struct RoadRenderer {
    params: RoadParams,
    state: RoadState,
    rng: ChaCha8Rng,
    vehicle_offset: Spring,
    vehicle_rotation: Spring,
    frames: u64,
    skipped: u64,
}

impl RoadRenderer {
    /// A renderer on a straight, empty road. `seed` fixes every curve the
    /// road will ever take.
    pub fn new(params: RoadParams, seed: u64) -> Self {
        Self {
            params,
            state: RoadState::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            vehicle_offset: Spring::ui(0.0),
            vehicle_rotation: Spring::ui(0.0),
            frames: 0,
            skipped: 0,
        }
    }

    /// Run one frame. If the surface has nowhere to draw, the whole frame is
    /// skipped: the road does not move and nothing is presented.
    pub fn frame<S: Surface + ?Sized>(
        &mut self,
        tick: FrameTick,
        inputs: SimulationInputs,
        surface: &mut S,
    ) -> bool {
        let Some(extent) = surface.extent() else {
            self.skipped += 1;
            trace!("frame {} skipped, no surface", tick.frame);
            return false;
        };

        self.state
            .advance(inputs, &self.params, tick.dt.as_secs_f64(), &mut self.rng);

        self.vehicle_offset
            .set_target(self.state.lateral_drift * self.params.lane_half_width);
        self.vehicle_rotation
            .set_target(-self.state.lateral_drift * self.params.max_tilt);
        let vehicle = VehiclePose {
            offset: self.vehicle_offset.step(tick.dt),
            rotation: self.vehicle_rotation.step(tick.dt),
        };

        surface.present(self.state.scene(
            inputs,
            &self.params,
            extent.width,
            extent.height,
            vehicle,
        ));
        self.frames += 1;
        true
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> &RoadState {
        &self.state
    }

    /// Where the car is drawn right now.
    pub fn vehicle(&self) -> VehiclePose {
        VehiclePose {
            offset: self.vehicle_offset.value(),
            rotation: self.vehicle_rotation.value(),
        }
    }

    /// Frames drawn.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames skipped for lack of a surface.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// A road renderer hooked up to a scheduler. Dropping the view cancels the
/// frame registration.
pub struct RoadView {
    renderer: Rc<RefCell<RoadRenderer>>,
    _registration: FrameHandle,
}

impl RoadView {
    /// Start rendering into `surface` on every tick of `scheduler`, reading
    /// whatever `inputs` holds at the start of each frame.
    pub fn activate<S>(
        scheduler: &FrameScheduler,
        renderer: RoadRenderer,
        inputs: Rc<Cell<SimulationInputs>>,
        surface: Rc<RefCell<S>>,
    ) -> Self
    where
        S: Surface + 'static,
    {
        let renderer = Rc::new(RefCell::new(renderer));
        // The scheduler only gets weak references, so it can never keep a
        // dead view's renderer alive.
        let weak_renderer = Rc::downgrade(&renderer);
        let weak_surface = Rc::downgrade(&surface);

        let registration = scheduler.register(move |tick| {
            let (Some(renderer), Some(surface)) = (weak_renderer.upgrade(), weak_surface.upgrade())
            else {
                return;
            };
            renderer
                .borrow_mut()
                .frame(tick, inputs.get(), &mut *surface.borrow_mut());
        });
        info!("road view activated");

        Self {
            renderer,
            _registration: registration,
        }
    }

    /// Borrow the renderer, e.g. to read its state for a read-out.
    pub fn renderer(&self) -> std::cell::Ref<'_, RoadRenderer> {
        self.renderer.borrow()
    }
}

impl Drop for RoadView {
    fn drop(&mut self) {
        info!(
            "road view torn down after {} frames ({} skipped)",
            self.renderer.borrow().frames(),
            self.renderer.borrow().skipped()
        );
    }
}
