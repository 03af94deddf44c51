//! Desktop device implementation

use async_trait::async_trait;
use quizalarm_host_api::{
    AlarmTimer, DeviceCapabilities, DeviceEvent, HostResult, HttpRequest, HttpResponse,
    HttpTransport, TimerHandle, TimerSpec, Vibrator,
};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{DesktopTimer, LogVibrator, ReqwestTransport};

/// Runs quizalarm on a regular computer: tokio timers, a logging vibrator,
/// and reqwest for sync traffic
pub struct DesktopDevice {
    capabilities: DeviceCapabilities,
    timer: DesktopTimer,
    vibrator: LogVibrator,
    transport: ReqwestTransport,
}

impl DesktopDevice {
    pub fn new() -> HostResult<Self> {
        Ok(Self {
            capabilities: DeviceCapabilities::desktop(),
            timer: DesktopTimer::new(),
            vibrator: LogVibrator::new(),
            transport: ReqwestTransport::new()?,
        })
    }

    pub fn vibrator(&self) -> &LogVibrator {
        &self.vibrator
    }

    pub fn live_timer_count(&self) -> usize {
        self.timer.live_count()
    }
}

#[async_trait]
impl AlarmTimer for DesktopDevice {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    async fn set_recurring_timer(&self, spec: TimerSpec) -> HostResult<TimerHandle> {
        self.timer.register(spec)
    }

    async fn cancel_timer(&self, handle: &TimerHandle) -> HostResult<()> {
        self.timer.cancel(handle)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<DeviceEvent> {
        self.timer.subscribe()
    }
}

#[async_trait]
impl Vibrator for DesktopDevice {
    async fn vibrate(&self, duration: Duration) -> HostResult<()> {
        self.vibrator
            .pulse(self.capabilities.clamp_vibration(duration))
    }

    async fn stop(&self) -> HostResult<()> {
        self.vibrator.stop()
    }
}

#[async_trait]
impl HttpTransport for DesktopDevice {
    async fn request(&self, request: HttpRequest) -> HostResult<HttpResponse> {
        self.transport.send(request).await
    }
}
