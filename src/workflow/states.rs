use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::Participant;
use crate::error::WorkflowError;

/// Every point the marine cargo workflow can rest at.
///
/// Wire names are the identifiers persisted in the store and accepted from
/// callers. They are kept byte-for-byte, misspellings included, because
/// existing records and participants already use them.
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
pub enum WorkflowState {
    #[strum(to_string = "initial")]
    Initial,

    // Purchase order negotiation
    #[strum(to_string = "Imp_PO_Draft")]
    ImpPoDraft,
    #[strum(to_string = "Exp_PO_Draft")]
    ExpPoDraft,
    #[strum(to_string = "Exp_PO_Agreed")]
    ExpPoAgreed,
    #[strum(to_string = "Imp_PO_EXWFinalized")]
    ImpPoExwFinalized,
    #[strum(to_string = "Imp_PO_CIFFinalized")]
    ImpPoCifFinalized,
    #[strum(to_string = "Imp_PO_CFRFinalized")]
    ImpPoCfrFinalized,
    #[strum(to_string = "Imp_PO_FOBFinalized")]
    ImpPoFobFinalized,
    #[strum(to_string = "Imp_PO_DDPFinalized")]
    ImpPoDdpFinalized,

    // Insurance application
    #[strum(to_string = "Exp_InsApp_Draft")]
    ExpInsAppDraft,
    #[strum(to_string = "Imp_InsApp_Draft")]
    ImpInsAppDraft,
    #[strum(to_string = "InsCo_InsApp_Draft")]
    InsCoInsAppDraft,
    #[strum(to_string = "Exp_InsApp_OpenCover")]
    ExpInsAppOpenCover,
    #[strum(to_string = "Imp_InsApp_OpenCover")]
    ImpInsAppOpenCover,

    // Shipping information
    #[strum(to_string = "Exp_ShipInfo_Draft")]
    ExpShipInfoDraft,
    #[strum(to_string = "Imp_ShipInfo_Draft")]
    ImpShipInfoDraft,
    #[strum(to_string = "InsCo_ShipInfo_Received")]
    InsCoShipInfoReceived,
    #[strum(to_string = "Exp_InsApp_Finalized")]
    ExpInsAppFinalized,
    #[strum(to_string = "Imp_InsApp_Finalized")]
    ImpInsAppFinalized,

    // Premium and fees
    #[strum(to_string = "InsCo_InsPremFee_Received")]
    InsCoInsPremFeeReceived,
    #[strum(to_string = "Exp_InsPremFee_Finalized")]
    ExpInsPremFeeFinalized,
    #[strum(to_string = "Imp_InsPremFee_Finalized")]
    ImpInsPremFeeFinalized,

    // Carriage
    #[strum(to_string = "Shipper_Product_PlantReady")]
    ShipperProductPlantReady,
    #[strum(to_string = "Shipper_Product_ExpLandTransport")]
    ShipperProductExpLandTransport,
    #[strum(to_string = "Shipper_Product_ExpPortReceived")]
    ShipperProductExpPortReceived,
    #[strum(to_string = "Shipper_Product_SeaTransport")]
    ShipperProductSeaTransport,
    #[strum(to_string = "Shipper_Product_ImpPortReceived")]
    ShipperProductImpPortReceived,
    #[strum(to_string = "Shipper_Product_ImpLandTransport")]
    ShipperProductImpLandTransport,
    #[strum(to_string = "Importer_Product_Destination")]
    ImporterProductDestination,
    #[strum(to_string = "Imp_Product_DestinationApproved")]
    ImpProductDestinationApproved,

    // Incidents and claims
    #[strum(to_string = "Exp_IncidentInfo_Received")]
    ExpIncidentInfoReceived,
    #[strum(to_string = "Imp_IncidentInfo_Received")]
    ImpIncidentInfoReceived,
    #[strum(to_string = "Exp_ClaimDoc_Draft")]
    ExpClaimDocDraft,
    #[strum(to_string = "InsCo_ClaimDoc_Received")]
    InsCoClaimDocReceived,
    #[strum(to_string = "Surveyor_Survey_Received")]
    SurveyorSurveyReceived,
    #[strum(to_string = "InsCo_Survey_Denied")]
    InsCoSurveyDenied,
    #[strum(to_string = "InsCo_Survery_Approved")]
    InsCoSurveyApproved,
    #[strum(to_string = "Exp_ClaimDoc_Denied")]
    ExpClaimDocDenied,
    #[strum(to_string = "Imp_ClaimDoc_Denied")]
    ImpClaimDocDenied,
    #[strum(to_string = "Exp_ClaimDoc_Approved")]
    ExpClaimDocApproved,
    #[strum(to_string = "Imp_ClaimDoc_Approved")]
    ImpClaimDocApproved,

    // Closed
    #[strum(to_string = "Final_ClaimDoc_Approved")]
    FinalClaimDocApproved,
    #[strum(to_string = "Final_ClaimDoc_Denied")]
    FinalClaimDocDenied,
    #[strum(to_string = "Final_Product_Approved")]
    FinalProductApproved,
}

impl WorkflowState {
    /// Parse a wire name, rejecting anything outside the enumeration.
    pub fn parse(name: &str) -> Result<Self, WorkflowError> {
        name.parse::<Self>()
            .map_err(|_| WorkflowError::UnknownState(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            WorkflowState::FinalClaimDocApproved
                | WorkflowState::FinalClaimDocDenied
                | WorkflowState::FinalProductApproved
        )
    }

    /// Participant expected to act next, if any.
    pub fn holder(self) -> Option<Participant> {
        if self.is_final() {
            return None;
        }
        Participant::from_wire_prefix(self.as_str())
    }
}

wire_name_serde!(WorkflowState);
