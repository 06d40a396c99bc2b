/// First byte of a data-channel message sent from a viewer to its render host.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
#[repr(u8)]
pub enum ToHost {
    IFrameRequest = 0,
    RequestQualityControl = 1,
    FpsRequest = 2,
    AverageBitrateRequest = 3,
    StartStreaming = 4,
    StopStreaming = 5,
    LatencyTest = 6,
    RequestInitialSettings = 7,
    UiInteraction = 50,
    Command = 51,
    KeyDown = 60,
    KeyUp = 61,
    KeyPress = 62,
    MouseEnter = 70,
    MouseLeave = 71,
    MouseDown = 72,
    MouseUp = 73,
    MouseMove = 74,
    MouseWheel = 75,
    TouchStart = 80,
    TouchEnd = 81,
    TouchMove = 82,
    GamepadButtonPressed = 90,
    GamepadButtonReleased = 91,
    GamepadAnalog = 92,
    Osc = 100,
    CameraSwitchResponse = 101,
    CameraSetRes = 105,
}

impl TryFrom<u8> for ToHost {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0 => ToHost::IFrameRequest,
            1 => ToHost::RequestQualityControl,
            2 => ToHost::FpsRequest,
            3 => ToHost::AverageBitrateRequest,
            4 => ToHost::StartStreaming,
            5 => ToHost::StopStreaming,
            6 => ToHost::LatencyTest,
            7 => ToHost::RequestInitialSettings,
            50 => ToHost::UiInteraction,
            51 => ToHost::Command,
            60 => ToHost::KeyDown,
            61 => ToHost::KeyUp,
            62 => ToHost::KeyPress,
            70 => ToHost::MouseEnter,
            71 => ToHost::MouseLeave,
            72 => ToHost::MouseDown,
            73 => ToHost::MouseUp,
            74 => ToHost::MouseMove,
            75 => ToHost::MouseWheel,
            80 => ToHost::TouchStart,
            81 => ToHost::TouchEnd,
            82 => ToHost::TouchMove,
            90 => ToHost::GamepadButtonPressed,
            91 => ToHost::GamepadButtonReleased,
            92 => ToHost::GamepadAnalog,
            100 => ToHost::Osc,
            101 => ToHost::CameraSwitchResponse,
            105 => ToHost::CameraSetRes,
            other => return Err(other),
        };
        Ok(op)
    }
}

/// First byte of a data-channel message sent from a render host to a viewer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
#[repr(u8)]
pub enum ToViewer {
    QualityControlOwnership = 0,
    Response = 1,
    Command = 2,
    FreezeFrame = 3,
    UnfreezeFrame = 4,
    VideoEncoderAvgQp = 5,
    LatencyTest = 6,
    InitialSettings = 7,
    FileExtension = 8,
    FileMimeType = 9,
    FileContents = 10,
    TestEcho = 11,
    InputControlOwnership = 12,
    GamepadResponse = 13,
    Custom = 128,
    CameraSwitchRequest = 129,
    Protocol = 255,
}

impl ToViewer {
    /// Opcodes whose payload is UTF-16LE text with no length prefix.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            ToViewer::Response
                | ToViewer::Command
                | ToViewer::VideoEncoderAvgQp
                | ToViewer::LatencyTest
                | ToViewer::InitialSettings
                | ToViewer::TestEcho
                | ToViewer::GamepadResponse
                | ToViewer::CameraSwitchRequest
        )
    }
}

impl TryFrom<u8> for ToViewer {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0 => ToViewer::QualityControlOwnership,
            1 => ToViewer::Response,
            2 => ToViewer::Command,
            3 => ToViewer::FreezeFrame,
            4 => ToViewer::UnfreezeFrame,
            5 => ToViewer::VideoEncoderAvgQp,
            6 => ToViewer::LatencyTest,
            7 => ToViewer::InitialSettings,
            8 => ToViewer::FileExtension,
            9 => ToViewer::FileMimeType,
            10 => ToViewer::FileContents,
            11 => ToViewer::TestEcho,
            12 => ToViewer::InputControlOwnership,
            13 => ToViewer::GamepadResponse,
            128 => ToViewer::Custom,
            129 => ToViewer::CameraSwitchRequest,
            255 => ToViewer::Protocol,
            other => return Err(other),
        };
        Ok(op)
    }
}
