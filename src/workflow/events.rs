use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::Participant;
use crate::error::WorkflowError;

/// Triggers raised by workflow participants.
///
/// As with [`super::WorkflowState`], wire names are kept exactly as the
/// participants send them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum WorkflowEvent {
    #[strum(to_string = "Imp_PO_Template_Open")]
    ImpPoTemplateOpen,
    #[strum(to_string = "Imp_PO_Draft_Submit")]
    ImpPoDraftSubmit,
    #[strum(to_string = "Imp_PO_Agree")]
    ImpPoAgree,

    // Incoterm agreements
    #[strum(to_string = "Exp_PO_EXW_Agree")]
    ExpPoExwAgree,
    #[strum(to_string = "Exp_PO_CIF_Agree")]
    ExpPoCifAgree,
    #[strum(to_string = "Exp_PO_CFR_Agree")]
    ExpPoCfrAgree,
    #[strum(to_string = "Exp_PO_FOB_Agree")]
    ExpPoFobAgree,
    #[strum(to_string = "Exp_PO_DDP_Agree")]
    ExpPoDdpAgree,
    #[strum(to_string = "Exp_PO_Draft_Amend")]
    ExpPoDraftAmend,

    #[strum(to_string = "Exp_InsApp_Exp_Submit")]
    ExpInsAppExpSubmit,
    #[strum(to_string = "InsCo_InsApp_Exp_Approve")]
    InsCoInsAppExpApprove,
    #[strum(to_string = "InsCo_InsApp_Imp_Approve")]
    InsCoInsAppImpApprove,
    #[strum(to_string = "InsCo_InsApp_Exp_Deny")]
    InsCoInsAppExpDeny,
    #[strum(to_string = "InsCo_InsApp_Imp_Deny")]
    InsCoInsAppImpDeny,

    #[strum(to_string = "Exp_ShipInfo_Exp_Received")]
    ExpShipInfoExpReceived,
    #[strum(to_string = "Exp_ShipInfo_Draft_Submit")]
    ExpShipInfoDraftSubmit,
    #[strum(to_string = "InsCo_ShipInfo_Exp_Approve")]
    InsCoShipInfoExpApprove,
    #[strum(to_string = "InsCo_ShipInfo_Imp_Approve")]
    InsCoShipInfoImpApprove,
    #[strum(to_string = "InsCo_ShipInfo_Imp_Deny")]
    InsCoShipInfoImpDeny,
    #[strum(to_string = "InsCo_ShipInfo_Exp_Deny")]
    InsCoShipInfoExpDeny,

    #[strum(to_string = "Exp_InsPremFee_Exp_Submit")]
    ExpInsPremFeeExpSubmit,
    #[strum(to_string = "InsCo_InsPremFee_Exp_Approve")]
    InsCoInsPremFeeExpApprove,
    #[strum(to_string = "InsCo_InsPremFee_Imp_Approve")]
    InsCoInsPremFeeImpApprove,
    #[strum(to_string = "InsCo_InsPremFee_Imp_Deny")]
    InsCoInsPremFeeImpDeny,
    #[strum(to_string = "InsCo_InsPremFee_Exp_Deny")]
    InsCoInsPremFeeExpDeny,

    #[strum(to_string = "Exp_Product_Ship_Request")]
    ExpProductShipRequest,
    #[strum(to_string = "Shipper_Product_Plant_Ship")]
    ShipperProductPlantShip,
    #[strum(to_string = "Shipper_Product_Sea_Ship")]
    ShipperProductSeaShip,
    #[strum(to_string = "Shipper_Product_ImpLand_Ship")]
    ShipperProductImpLandShip,
    #[strum(to_string = "Imp_Product_Desitination_OK")]
    ImpProductDestinationOk,
    #[strum(to_string = "Imp_Product_Exp_Approve")]
    ImpProductExpApprove,

    // Incidents reported along the route
    #[strum(to_string = "Shipper_Product_ExpPortExp_Incident")]
    ShipperProductExpPortExpIncident,
    #[strum(to_string = "Shipper_Product_ExpPortImp_Incident")]
    ShipperProductExpPortImpIncident,
    #[strum(to_string = "Shipper_Product_ImpPortExp_Incident")]
    ShipperProductImpPortExpIncident,
    #[strum(to_string = "Shipper_Product_ImpPortImp_Incident")]
    ShipperProductImpPortImpIncident,
    #[strum(to_string = "Shipper_Product_DestinationExp_Incident")]
    ShipperProductDestinationExpIncident,
    #[strum(to_string = "Shipper_Product_DestinationImp_Incident")]
    ShipperProductDestinationImpIncident,

    // Claims
    #[strum(to_string = "Exp_ClaimDoc_Template_Open")]
    ExpClaimDocTemplateOpen,
    #[strum(to_string = "Exp_ClaimDoc_Draft_Submit")]
    ExpClaimDocDraftSubmit,
    #[strum(to_string = "InsCo_ClaimDoc_Surveyor_Send")]
    InsCoClaimDocSurveyorSend,
    #[strum(to_string = "Surveyor_ClaimDoc_Survery_Deny")]
    SurveyorClaimDocSurveyDeny,
    #[strum(to_string = "Sureveyor_ClaimDoc_Survey_Approve")]
    SurveyorClaimDocSurveyApprove,
    #[strum(to_string = "InsCo_ClaimDoc_Exp_Deny")]
    InsCoClaimDocExpDeny,
    #[strum(to_string = "InsCo_ClaimDoc_Exp_Approve")]
    InsCoClaimDocExpApprove,
    #[strum(to_string = "InsCo_ClaimDoc_Imp_Approve")]
    InsCoClaimDocImpApprove,
    #[strum(to_string = "Exp_Claim_Imp_Inform")]
    ExpClaimImpInform,
    #[strum(to_string = "Exp_ClaimDoc_Deny_Send")]
    ExpClaimDocDenySend,
}

impl WorkflowEvent {
    pub fn parse(name: &str) -> Result<Self, WorkflowError> {
        name.parse::<Self>()
            .map_err(|_| WorkflowError::UnknownEvent(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Participant that raises this event. Informational; never checked.
    pub fn actor(self) -> Participant {
        // Every event name carries a participant prefix.
        Participant::from_wire_prefix(self.as_str()).unwrap_or(Participant::Shipper)
    }
}

wire_name_serde!(WorkflowEvent);
